use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

pub const DELIMITER: char = '_';

/// Semantic role encoded by the leading segment of a field name.
///
/// The set is closed: adding a role means adding a variant here and a policy
/// arm in the resolver, which the compiler forces through exhaustive matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleTag {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "terms")]
    Terms,
    #[serde(rename = "textBody")]
    TextBody,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "cost")]
    Cost,
    #[serde(rename = "rank")]
    Rank,
    #[serde(rename = "coordinate")]
    Coordinate,
    #[serde(rename = "booleanFlag")]
    BooleanFlag,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "placeName")]
    PlaceName,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "currency")]
    Currency,
}

impl RoleTag {
    pub const ALL: [RoleTag; 14] = [
        RoleTag::Id,
        RoleTag::Title,
        RoleTag::Terms,
        RoleTag::TextBody,
        RoleTag::Date,
        RoleTag::Cost,
        RoleTag::Rank,
        RoleTag::Coordinate,
        RoleTag::BooleanFlag,
        RoleTag::Json,
        RoleTag::PlaceName,
        RoleTag::Year,
        RoleTag::Type,
        RoleTag::Currency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Id => "id",
            RoleTag::Title => "title",
            RoleTag::Terms => "terms",
            RoleTag::TextBody => "textBody",
            RoleTag::Date => "date",
            RoleTag::Cost => "cost",
            RoleTag::Rank => "rank",
            RoleTag::Coordinate => "coordinate",
            RoleTag::BooleanFlag => "booleanFlag",
            RoleTag::Json => "json",
            RoleTag::PlaceName => "placeName",
            RoleTag::Year => "year",
            RoleTag::Type => "type",
            RoleTag::Currency => "currency",
        }
    }

    /// Exact, case-sensitive lookup of a name segment.
    pub fn from_segment(segment: &str) -> Option<RoleTag> {
        RoleTag::ALL.into_iter().find(|r| r.as_str() == segment)
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed field name, e.g. `placeName_city_organisation` is
/// `{role: placeName, subtype: "city", entity: "organisation"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIdentifier {
    raw: String,
    role: RoleTag,
    subtype: String,
    entity: String,
}

impl FieldIdentifier {
    /// Parse a top-level field name: at least two non-empty segments, the
    /// first naming a known role, the last naming the owning entity.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SchemaError::malformed(raw, "empty identifier"));
        }
        let segments: Vec<&str> = raw.split(DELIMITER).collect();
        if segments.len() < 2 {
            return Err(SchemaError::malformed(raw, "fewer than two segments"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SchemaError::malformed(raw, "empty segment"));
        }
        if raw.contains('.') {
            return Err(SchemaError::malformed(raw, "'.' is reserved for nested paths"));
        }

        let role = RoleTag::from_segment(segments[0]).ok_or_else(|| SchemaError::UnknownRole {
            name: raw.to_string(),
            role: segments[0].to_string(),
        })?;
        let entity = segments[segments.len() - 1];
        let subtype = segments[1..segments.len() - 1].join("_");

        Ok(Self {
            raw: raw.to_string(),
            role,
            subtype,
            entity: entity.to_string(),
        })
    }

    /// Parse the name of a child declared under a `json_*` field.
    ///
    /// Children are local to their parent object, so they carry no entity
    /// and may be a single segment (`year`). The role is the first segment
    /// when it names one, else the last (`start_date`). The remaining
    /// segments form the subtype.
    pub fn parse_child(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SchemaError::malformed(raw, "empty identifier"));
        }
        let segments: Vec<&str> = raw.split(DELIMITER).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SchemaError::malformed(raw, "empty segment"));
        }
        if raw.contains('.') {
            return Err(SchemaError::malformed(raw, "'.' is reserved for nested paths"));
        }

        let last = segments.len() - 1;
        let (role, rest) = if let Some(role) = RoleTag::from_segment(segments[0]) {
            (role, &segments[1..])
        } else if let Some(role) = RoleTag::from_segment(segments[last]) {
            (role, &segments[..last])
        } else {
            return Err(SchemaError::UnknownRole {
                name: raw.to_string(),
                role: segments[0].to_string(),
            });
        };

        Ok(Self {
            raw: raw.to_string(),
            role,
            subtype: rest.join("_"),
            entity: String::new(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn role(&self) -> RoleTag {
        self.role
    }

    /// Middle segments joined by the delimiter. Empty for two-segment names.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for FieldIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
