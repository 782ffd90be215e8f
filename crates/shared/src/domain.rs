use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ModuleId);
id_newtype!(ContentId);
id_newtype!(ScheduleId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Instructor.
    Pemateri,
    /// Participant.
    Peserta,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pemateri => "pemateri",
            Role::Peserta => "peserta",
        }
    }

    /// Admins and instructors may author modules and their contents.
    pub fn can_edit_content(self) -> bool {
        matches!(self, Role::Admin | Role::Pemateri)
    }

    pub fn can_manage_users(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pemateri" | "instructor" => Ok(Role::Pemateri),
            "peserta" | "participant" => Ok(Role::Peserta),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Reading material.
    #[default]
    Materi,
    Video,
    Quiz,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Materi => "materi",
            ContentType::Video => "video",
            ContentType::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "materi" | "material" => Ok(ContentType::Materi),
            "video" => Ok(ContentType::Video),
            "quiz" => Ok(ContentType::Quiz),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}
