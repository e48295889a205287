use serde::Deserialize;

use crate::db::{
    Job, JobStatus, JobType, Payload,
};

// tasks that map onto a job type of the same name
const GENERATION_TASKS: [(&str, JobType); 6] = [
    ("face", JobType::Face),
    ("fullbody", JobType::Fullbody),
    ("angles360", JobType::Angles360),
    ("expression", JobType::Expression),
    ("background", JobType::Background),
    ("dress", JobType::Dress),
];

// body of `POST /generate`
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model_id: Option<String>,

    #[serde(default)]
    pub pipeline_id: Option<String>,

    // free-form, unlike `Job::kind`
    pub task: String,

    #[serde(default = "default_promptless")]
    pub promptless: bool,

    #[serde(default)]
    pub params: Payload,
}

fn default_promptless() -> bool {
    true
}

/// Maps a free-form task onto a job type; anything unknown becomes `dataset`.
pub fn job_type_for_task(task: &str) -> JobType {
    GENERATION_TASKS
        .iter()
        .find(|(name, _)| *name == task)
        .map(|(_, kind)| *kind)
        .unwrap_or(JobType::Dataset)
}

impl GenerateRequest {
    // the job always starts queued, whatever was asked for
    pub fn into_job(self) -> Job {
        Job {
            kind: job_type_for_task(&self.task),
            model_id: self.model_id,
            pipeline_id: self.pipeline_id,
            params: self.params,
            status: JobStatus::Queued,
            progress: 0,
            output: vec![],
        }
    }
}
