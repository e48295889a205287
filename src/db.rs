use serde::{
    Serialize, Deserialize
};
use serde_json::{
    Map, Value
};

// mongodb database models for the studio collections

// opaque key-value payload, stored verbatim
pub type Payload = Map<String, Value>;

pub const MODELS: &str = "model";
pub const PIPELINES: &str = "pipeline";
pub const DATASETS: &str = "dataset";
pub const JOBS: &str = "job";

/// A record shape that lives in its own collection.
pub trait Record: Serialize + Send + Sync {
    const COLLECTION: &'static str;

    // checks that serde alone cannot express
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

// a reusable identity profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub identity_seed: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    // e.g. studio, street, editorial
    #[serde(default)]
    pub style_preset: Option<String>,

    #[serde(default)]
    pub face_embeddings: Option<Vec<String>>,

    #[serde(default)]
    pub consistency_profile: Payload,
}

impl Record for Model {
    const COLLECTION: &'static str = MODELS;

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("`name` must not be empty".to_string());
        }
        Ok(())
    }
}

// graph definition, nodes and edges are not interpreted here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub nodes: Vec<Payload>,

    #[serde(default)]
    pub edges: Vec<Payload>,
}

impl Record for Pipeline {
    const COLLECTION: &'static str = PIPELINES;
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    #[default]
    Idle,

    Building,

    Ready,

    Failed,
}

// curated or generated items grouped for fine-tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    // advisory reference to a model, never checked
    #[serde(default)]
    pub model_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub status: DatasetStatus,

    #[serde(default)]
    pub size: i64,

    #[serde(default)]
    pub items: Vec<Payload>,
}

impl Record for Dataset {
    const COLLECTION: &'static str = DATASETS;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Face,

    Fullbody,

    Angles360,

    Expression,

    Background,

    Dress,

    Dataset,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,

    Running,

    Succeeded,

    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }
}

// a unit of requested work; nothing advances it after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "type")]
    pub kind: JobType,

    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub pipeline_id: Option<String>,

    #[serde(default)]
    pub params: Payload,

    #[serde(default)]
    pub status: JobStatus,

    #[serde(default)]
    pub progress: i64,

    // generated assets, never populated by this service
    #[serde(default)]
    pub output: Vec<Payload>,
}

impl Record for Job {
    const COLLECTION: &'static str = JOBS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_defaults_are_filled_in() {
        let model: Model = serde_json::from_value(json!({"name": "Aisha v1"})).unwrap();
        assert_eq!(model.name, "Aisha v1");
        assert!(model.tags.is_empty());
        assert!(model.face_embeddings.is_none());
        assert!(model.consistency_profile.is_empty());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn model_without_name_is_rejected() {
        let res = serde_json::from_value::<Model>(json!({"description": "no name"}));
        assert!(res.is_err());
    }

    #[test]
    fn empty_model_name_fails_validation() {
        let model: Model = serde_json::from_value(json!({"name": ""})).unwrap();
        assert!(model.validate().is_err());

        let spaced: Model = serde_json::from_value(json!({"name": "   "})).unwrap();
        assert!(spaced.validate().is_ok());
    }

    #[test]
    fn counters_must_be_json_integers() {
        assert!(serde_json::from_value::<Job>(json!({"type": "face", "progress": 40.0})).is_err());
        assert!(serde_json::from_value::<Dataset>(json!({"title": "t", "size": 3.0})).is_err());
        assert!(serde_json::from_value::<Dataset>(json!({"title": "t", "size": 3})).is_ok());
    }

    #[test]
    fn pipeline_defaults_and_opaque_nodes() {
        let pipeline: Pipeline = serde_json::from_value(json!({
            "name": "portrait",
            "nodes": [{"kind": "loader", "anything": {"deep": [1, 2, 3]}}],
        }))
        .unwrap();
        assert_eq!(pipeline.version, "1.0");
        assert!(pipeline.is_active);
        assert_eq!(pipeline.nodes[0]["anything"]["deep"][2], 3);
        assert!(pipeline.edges.is_empty());
    }

    #[test]
    fn dataset_status_is_restricted() {
        let ok: Dataset = serde_json::from_value(json!({"title": "spring"})).unwrap();
        assert_eq!(ok.status, DatasetStatus::Idle);
        assert_eq!(ok.size, 0);

        let bad = serde_json::from_value::<Dataset>(json!({"title": "spring", "status": "done"}));
        assert!(bad.is_err());
    }

    #[test]
    fn job_type_is_strict() {
        let job: Job = serde_json::from_value(json!({
            "type": "face",
            "status": "running",
            "progress": 40,
        }))
        .unwrap();
        assert_eq!(job.kind, JobType::Face);
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 40);

        assert!(serde_json::from_value::<Job>(json!({"type": "sparkle"})).is_err());
        assert!(serde_json::from_value::<Job>(json!({"progress": 1})).is_err());
    }

    #[test]
    fn job_serializes_type_under_its_wire_name() {
        let job: Job = serde_json::from_value(json!({"type": "angles360"})).unwrap();
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], "angles360");
        assert_eq!(value["status"], "queued");
        assert!(value.get("kind").is_none());
    }
}
