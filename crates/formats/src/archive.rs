use std::fmt;
use std::io::{Cursor, Read};

/// One regular file inside an uploaded zip archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveMember {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Flat view of an uploaded zip archive.
///
/// Member names are unique (a duplicate name keeps the first occurrence),
/// directory entries are skipped, and nothing is descended into: nested
/// archives are opaque bytes. The raw upload is content-hashed so events
/// and layers can reference the exact bytes that produced them.
#[derive(Debug, Clone)]
pub struct UploadedArchive {
    members: Vec<ArchiveMember>,
    content_hash: String,
}

#[derive(Debug)]
pub enum ArchiveError {
    Zip(zip::result::ZipError),
    MemberRead { name: String, source: std::io::Error },
    MissingShp,
    MissingDbf,
    AmbiguousShp,
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Zip(err) => write!(f, "archive error: {err}"),
            ArchiveError::MemberRead { name, source } => {
                write!(f, "failed to read archive member {name}: {source}")
            }
            ArchiveError::MissingShp => write!(f, "archive contains no .shp member"),
            ArchiveError::MissingDbf => write!(f, "archive contains no .dbf member"),
            ArchiveError::AmbiguousShp => {
                write!(f, "archive contains more than one .shp member")
            }
        }
    }
}

impl std::error::Error for ArchiveError {}

impl UploadedArchive {
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let content_hash = blake3::hash(bytes).to_hex().to_string();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Zip)?;

        let mut members: Vec<ArchiveMember> = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(ArchiveError::Zip)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            if members.iter().any(|m| m.name == name) {
                continue;
            }
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|source| ArchiveError::MemberRead {
                    name: name.clone(),
                    source,
                })?;
            members.push(ArchiveMember { name, bytes });
        }

        Ok(Self {
            members,
            content_hash,
        })
    }

    pub fn members(&self) -> &[ArchiveMember] {
        &self.members
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn member_bytes(&self, name: &str) -> Option<&[u8]> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.bytes.as_slice())
    }

    pub fn member_text(&self, name: &str) -> Option<String> {
        self.member_bytes(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Archive members classified by extension (ASCII case-insensitive suffix).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapefileComponentSet {
    pub shp: Vec<String>,
    pub dbf: Vec<String>,
    pub prj: Vec<String>,
}

impl ShapefileComponentSet {
    pub fn classify(archive: &UploadedArchive) -> Self {
        let mut set = Self::default();
        for member in archive.members() {
            if has_suffix(&member.name, ".shp") {
                set.shp.push(member.name.clone());
            } else if has_suffix(&member.name, ".dbf") {
                set.dbf.push(member.name.clone());
            } else if has_suffix(&member.name, ".prj") {
                set.prj.push(member.name.clone());
            }
        }
        set
    }

    /// A valid upload has exactly one `.shp` and at least one `.dbf`.
    /// Extra `.prj` members are tolerated; only the first is consulted.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        if self.shp.is_empty() {
            return Err(ArchiveError::MissingShp);
        }
        if self.shp.len() > 1 {
            return Err(ArchiveError::AmbiguousShp);
        }
        if self.dbf.is_empty() {
            return Err(ArchiveError::MissingDbf);
        }
        Ok(())
    }

    pub fn shp_name(&self) -> Option<&str> {
        self.shp.first().map(String::as_str)
    }

    pub fn dbf_name(&self) -> Option<&str> {
        self.dbf.first().map(String::as_str)
    }

    pub fn prj_name(&self) -> Option<&str> {
        self.prj.first().map(String::as_str)
    }
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    let name = name.as_bytes();
    let suffix = suffix.as_bytes();
    name.len() >= suffix.len() && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}
