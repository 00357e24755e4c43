use serde::{Deserialize, Serialize};

// Wire types for the managed training/inference control plane. State names
// follow the platform's PascalCase convention; *_db_str maps them onto the
// status columns.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Submitted,
    InProgress,
    Completed,
    Failed,
    Stopped,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Stopped)
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            JobState::Submitted => "submitted",
            JobState::InProgress => "in_progress",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Stopped => "stopped",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointState {
    Creating,
    InService,
    Failed,
    Deleted,
}

impl EndpointState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EndpointState::Creating)
    }

    pub fn as_db_str(&self) -> &'static str {
        match self {
            EndpointState::Creating => "creating",
            EndpointState::InService => "in_service",
            EndpointState::Failed => "failed",
            EndpointState::Deleted => "deleted",
        }
    }
}

/// LoRA + quantization knobs forwarded verbatim to the training image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub epochs: u32,
    pub learning_rate: f64,
    pub per_device_train_batch_size: u32,
    pub lora_r: u32,
    pub lora_alpha: u32,
    pub lora_dropout: f64,
    pub load_in_8bit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    pub name: String,
    pub base_model: String,
    pub input_uri: String,
    pub instance_type: String,
    pub instance_count: u32,
    pub hyperparameters: Hyperparameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingJobStatus {
    pub name: String,
    pub state: JobState,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub artifact_uri: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    pub artifact_uri: String,
    pub instance_type: String,
    pub initial_instance_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub name: String,
    pub state: EndpointState,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub inputs: String,
    pub parameters: GenerationParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub generated_text: String,
}
