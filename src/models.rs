use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level `{ "data": { "id": .., "attributes": .. } }` wrapper returned for
/// a single resource.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Entry<T>,
}

#[derive(Debug, Deserialize)]
pub struct Entry<T> {
    pub id: u64,
    pub attributes: T,
}

/// A populated relation: `{ "data": [ entry, .. ] }`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Relation<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

/// Relation entry where only the id is used.
#[derive(Debug, Deserialize)]
pub struct LinkedId {
    pub id: u64,
}

// ── Course ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CourseAttributes {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Lectures")]
    pub lectures: Relation<LinkedId>,
}

pub type CourseRecord = Envelope<CourseAttributes>;

// ── Lecture ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LectureAttributes {
    #[serde(rename = "Title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(rename = "versionNumber", default)]
    pub version_number: Option<Value>,
    /// Version history relation, kept as raw JSON.
    #[serde(default)]
    pub versions: Option<Value>,
    #[serde(rename = "Blocks")]
    pub blocks: Relation<Entry<BlockSummary>>,
    #[serde(rename = "LectureCreators", default, deserialize_with = "null_as_default")]
    pub creators: Relation<Entry<LectureCreator>>,
    #[serde(rename = "LearningOutcomes", default, deserialize_with = "null_as_default")]
    pub learning_outcomes: Vec<LearningOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct BlockSummary {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LectureCreator {
    #[serde(rename = "FirstName", default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(rename = "LastName", default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "ORCID", default)]
    pub orcid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LearningOutcome {
    #[serde(rename = "LearningOutcome", default, deserialize_with = "null_as_default")]
    pub text: String,
}

pub type LectureRecord = Envelope<LectureAttributes>;

impl LectureAttributes {
    /// Version number as shown to users; strings are printed without quotes.
    pub fn version_label(&self) -> Option<String> {
        match self.version_number.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Ids of the entries in the `versions` relation, or the raw JSON when it
    /// has some other shape.
    pub fn versions_label(&self) -> Option<String> {
        let versions = self.versions.as_ref()?;
        let entries = match versions {
            Value::Null => return None,
            Value::Object(map) => map.get("data").and_then(Value::as_array),
            Value::Array(items) => Some(items),
            _ => None,
        };
        match entries {
            Some(items) => {
                let ids: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.get("id"))
                    .map(Value::to_string)
                    .collect();
                Some(ids.join(", "))
            }
            None => Some(versions.to_string()),
        }
    }
}

// ── Block ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BlockAttributes {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Document", default)]
    pub document: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
}

impl BlockAttributes {
    pub fn is_published(&self) -> bool {
        self.published_at.as_deref().is_some_and(|s| !s.is_empty())
    }
}

pub type BlockRecord = Envelope<BlockAttributes>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lecture_parses_populated_relations() {
        let json = r#"{
            "data": {
                "id": 2,
                "attributes": {
                    "Title": "Energy access",
                    "Abstract": "An abstract.",
                    "versionNumber": 3,
                    "Blocks": { "data": [
                        { "id": 11, "attributes": { "Title": "Intro" } },
                        { "id": 12, "attributes": { "Title": "Methods" } }
                    ] },
                    "LectureCreators": { "data": [
                        { "id": 1, "attributes": {
                            "FirstName": "Ada", "LastName": "Lovelace",
                            "Email": "ada@example.com", "ORCID": null
                        } }
                    ] },
                    "LearningOutcomes": [ { "id": 5, "LearningOutcome": "Explain X" } ]
                }
            },
            "meta": {}
        }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(lecture.data.id, 2);
        let attrs = &lecture.data.attributes;
        assert_eq!(attrs.title, "Energy access");
        assert_eq!(attrs.version_label().as_deref(), Some("3"));
        let ids: Vec<u64> = attrs.blocks.data.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![11, 12]);
        assert_eq!(attrs.creators.data[0].attributes.last_name, "Lovelace");
        assert!(attrs.creators.data[0].attributes.orcid.is_none());
        assert_eq!(attrs.learning_outcomes[0].text, "Explain X");
    }

    #[test]
    fn lecture_without_blocks_is_rejected() {
        let json = r#"{ "data": { "id": 2, "attributes": { "Title": "No blocks" } } }"#;
        let err = serde_json::from_str::<LectureRecord>(json).unwrap_err();
        assert!(err.to_string().contains("Blocks"));
    }

    #[test]
    fn block_publication_state() {
        let json = r#"{ "data": { "id": 7, "attributes": {
            "Document": "text", "publishedAt": null
        } } }"#;
        let block: BlockRecord = serde_json::from_str(json).unwrap();
        assert!(!block.data.attributes.is_published());

        let json = r#"{ "data": { "id": 7, "attributes": {
            "Document": "text", "publishedAt": "2023-05-01T10:00:00.000Z"
        } } }"#;
        let block: BlockRecord = serde_json::from_str(json).unwrap();
        assert!(block.data.attributes.is_published());
    }

    #[test]
    fn nulls_in_unused_fields_fall_back_to_defaults() {
        let json = r#"{ "data": { "id": 4, "attributes": {
            "Title": null,
            "Blocks": { "data": [ { "id": 1, "attributes": { "Title": null } } ] },
            "LectureCreators": { "data": [ { "id": 1, "attributes": {
                "FirstName": null, "LastName": "Okafor" } } ] },
            "LearningOutcomes": [ { "LearningOutcome": null } ]
        } } }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        let attrs = &lecture.data.attributes;
        assert_eq!(attrs.title, "");
        assert_eq!(attrs.blocks.data.len(), 1);
        assert_eq!(attrs.creators.data[0].attributes.first_name, "");
        assert_eq!(attrs.creators.data[0].attributes.last_name, "Okafor");
        assert_eq!(attrs.learning_outcomes[0].text, "");

        let json = r#"{ "data": { "id": 4, "attributes": {
            "Blocks": { "data": [] }, "LectureCreators": null, "LearningOutcomes": null
        } } }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        assert!(lecture.data.attributes.creators.data.is_empty());
        assert!(lecture.data.attributes.learning_outcomes.is_empty());
    }

    #[test]
    fn versions_label_lists_relation_ids() {
        let json = r#"{ "data": { "id": 1, "attributes": {
            "Blocks": { "data": [] },
            "versions": { "data": [ { "id": 7, "attributes": {} }, { "id": 9, "attributes": {} } ] }
        } } }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(lecture.data.attributes.versions_label().as_deref(), Some("7, 9"));

        let json = r#"{ "data": { "id": 1, "attributes": { "Blocks": { "data": [] } } } }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        assert!(lecture.data.attributes.versions_label().is_none());
    }

    #[test]
    fn version_label_strips_string_quotes() {
        let json = r#"{ "data": { "id": 1, "attributes": {
            "Title": "t", "versionNumber": "1.2", "Blocks": { "data": [] }
        } } }"#;
        let lecture: LectureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(lecture.data.attributes.version_label().as_deref(), Some("1.2"));
    }
}
