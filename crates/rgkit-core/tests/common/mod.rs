use async_trait::async_trait;
use rgkit_core::{ProviderError, Record, ResourceClient};
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a fake provider call should fail
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NotFound,
    Api,
}

impl Failure {
    fn to_error(self, what: &str) -> ProviderError {
        match self {
            Failure::NotFound => ProviderError::NotFound(what.to_string()),
            Failure::Api => ProviderError::Api(format!("{} rejected", what)),
        }
    }
}

/// Provider client that records calls instead of talking to a cloud
pub struct FakeClient {
    identity_field: String,
    pub create_output: Record,
    pub describe_output: Record,
    pub create_failure: Option<Failure>,
    pub describe_failure: Option<Failure>,
    pub delete_failure: Option<Failure>,
    pub creates: AtomicUsize,
    pub describes: AtomicUsize,
    pub deletes: AtomicUsize,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new(identity_field: &str) -> Self {
        Self {
            identity_field: identity_field.to_string(),
            create_output: Record::new(),
            describe_output: Record::new(),
            create_failure: None,
            describe_failure: None,
            delete_failure: None,
            creates: AtomicUsize::new(0),
            describes: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_describe_output(mut self, value: Value) -> Self {
        self.describe_output = Record::from_value(value).unwrap();
        self
    }

    pub fn with_create_output(mut self, value: Value) -> Self {
        self.create_output = Record::from_value(value).unwrap();
        self
    }

    pub fn failing_create(mut self, failure: Failure) -> Self {
        self.create_failure = Some(failure);
        self
    }

    pub fn failing_describe(mut self, failure: Failure) -> Self {
        self.describe_failure = Some(failure);
        self
    }

    pub fn failing_delete(mut self, failure: Failure) -> Self {
        self.delete_failure = Some(failure);
        self
    }

    pub fn calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.describes.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    fn kind(&self) -> &str {
        "fake"
    }

    fn display_name(&self) -> &str {
        "Fake Resource"
    }

    fn identity_field(&self) -> &str {
        &self.identity_field
    }

    async fn create(&self, _config: &Record) -> Result<Record, ProviderError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        match self.create_failure {
            Some(failure) => Err(failure.to_error("create")),
            None => Ok(self.create_output.clone()),
        }
    }

    async fn describe(&self, _config: &Record) -> Result<Record, ProviderError> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        match self.describe_failure {
            Some(failure) => Err(failure.to_error("describe")),
            None => Ok(self.describe_output.clone()),
        }
    }

    async fn delete(&self, identity: &str, _state: &Record) -> Result<(), ProviderError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.deleted.lock().unwrap().push(identity.to_string());
        match self.delete_failure {
            Some(failure) => Err(failure.to_error("delete")),
            None => Ok(()),
        }
    }
}

pub fn record(value: Value) -> Record {
    Record::from_value(value).unwrap()
}
