use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque artifact session identifier.
///
/// Rendered as 32 lowercase hex characters so it can be used directly as a URL
/// path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s.trim()).map(Self)
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Derived lifecycle state of an artifact session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Input stored, transformation still running
    Pending,
    /// Output attached and downloadable
    Ready,
    /// Transformation failed; nothing to download
    Failed,
    /// TTL elapsed
    Expired,
    /// Removed from the store
    Deleted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Pending => "pending",
            SessionState::Ready => "ready",
            SessionState::Failed => "failed",
            SessionState::Expired => "expired",
            SessionState::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One conversion job's temporary files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSession {
    pub id: SessionId,
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation; never extended.
    pub expires_at: DateTime<Utc>,
    pub failure: Option<String>,
}

impl ArtifactSession {
    pub fn new(
        id: SessionId,
        input_path: PathBuf,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            input_path,
            output_path: None,
            created_at,
            expires_at,
            failure: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if self.is_expired_at(now) {
            SessionState::Expired
        } else if self.failure.is_some() {
            SessionState::Failed
        } else if self.output_path.is_some() {
            SessionState::Ready
        } else {
            SessionState::Pending
        }
    }

    /// Whether this session owns `path` as its input or output
    pub fn references(&self, path: &Path) -> bool {
        self.input_path == path || self.output_path.as_deref() == Some(path)
    }

    /// Every file this session owns on disk
    pub fn owned_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.input_path.clone()];
        if let Some(output) = &self.output_path {
            paths.push(output.clone());
        }
        paths
    }
}

/// Returned by the store on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    pub id: SessionId,
    pub expires_at: DateTime<Utc>,
}

/// Response for an accepted tool job
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionTicketResponse {
    /// Opaque session id (32 hex characters)
    pub session_id: String,
    /// RFC 3339 expiry of the produced artifact
    pub expires_at: DateTime<Utc>,
    /// Poll this URL for the processing state
    pub status_url: String,
    /// Download the result from this URL once ready
    pub download_url: String,
}

/// Response for session status polling
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub state: SessionState,
    pub expires_at: DateTime<Utc>,
    pub has_output: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SessionStatusResponse {
    pub fn from_session(session: &ArtifactSession, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session.id.to_string(),
            state: session.state_at(now),
            expires_at: session.expires_at,
            has_output: session.output_path.is_some(),
            failure: session.failure.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(now: DateTime<Utc>) -> ArtifactSession {
        ArtifactSession::new(
            SessionId::generate(),
            PathBuf::from("/tmp/in.pdf"),
            now,
            now + Duration::seconds(240),
        )
    }

    #[test]
    fn test_session_id_is_url_safe_hex() {
        let id = SessionId::generate();
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 32);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let parsed: SessionId = rendered.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_session_id_rejects_garbage() {
        assert!("not-a-session".parse::<SessionId>().is_err());
        assert!("".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_state_transitions() {
        let now = Utc::now();
        let mut s = session(now);
        assert_eq!(s.state_at(now), SessionState::Pending);

        s.output_path = Some(PathBuf::from("/tmp/out.txt"));
        assert_eq!(s.state_at(now), SessionState::Ready);

        s.failure = Some("bad input".to_string());
        assert_eq!(s.state_at(now), SessionState::Failed);

        assert_eq!(s.state_at(s.expires_at), SessionState::Expired);
        assert!(s.is_expired_at(s.expires_at));
        assert!(!s.is_expired_at(s.expires_at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_owned_paths_and_references() {
        let now = Utc::now();
        let mut s = session(now);
        assert_eq!(s.owned_paths(), vec![PathBuf::from("/tmp/in.pdf")]);

        s.output_path = Some(PathBuf::from("/tmp/out.txt"));
        assert_eq!(s.owned_paths().len(), 2);
        assert!(s.references(Path::new("/tmp/out.txt")));
        assert!(!s.references(Path::new("/tmp/other.txt")));
    }

    #[test]
    fn test_status_response_serializes_lowercase_state() {
        let now = Utc::now();
        let s = session(now);
        let json = serde_json::to_value(SessionStatusResponse::from_session(&s, now)).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["has_output"], false);
        assert!(json.get("failure").is_none());
    }
}
