use std::io;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = "session";

/// The signed-in identity, passed explicitly to every call site that needs
/// an author or an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let trimmed = user_id.trim();
        if trimmed.is_empty() {
            return Self::anonymous();
        }
        Self {
            user_id: Some(trimmed.to_string()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Reads the persisted session. A missing file means nobody is signed in.
    pub fn load(data_dir: &Path) -> io::Result<Self> {
        match std::fs::read_to_string(session_path(data_dir)) {
            Ok(raw) => Ok(Self::signed_in(raw.lines().next().unwrap_or_default())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::anonymous()),
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, data_dir: &Path) -> io::Result<()> {
        match self.user_id.as_deref() {
            Some(user_id) => {
                std::fs::create_dir_all(data_dir)?;
                std::fs::write(session_path(data_dir), format!("{user_id}\n"))
            }
            None => Self::clear(data_dir),
        }
    }

    pub fn clear(data_dir: &Path) -> io::Result<()> {
        match std::fs::remove_file(session_path(data_dir)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

#[cfg(test)]
mod tests {
    use super::Session;
    use uuid::Uuid;

    fn unique_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("leadboard-session-{}", Uuid::now_v7()))
    }

    #[test]
    fn missing_file_loads_as_anonymous() {
        let dir = unique_dir();
        let session = Session::load(&dir).expect("load should succeed");
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn save_load_and_clear_round_trip_through_the_data_dir() {
        let dir = unique_dir();
        Session::signed_in("  U1  ")
            .save(&dir)
            .expect("save should succeed");
        assert_eq!(
            Session::load(&dir).expect("load").user_id(),
            Some("U1")
        );

        Session::clear(&dir).expect("clear should succeed");
        assert_eq!(Session::load(&dir).expect("load").user_id(), None);
        Session::clear(&dir).expect("clearing twice is fine");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn blank_user_id_is_anonymous() {
        assert_eq!(Session::signed_in("   "), Session::anonymous());
    }
}
