use async_trait::async_trait;
use document_store::{ConnectivityResult, CreatedEntry, WaitlistBackend};
use shared::{domain::WaitlistEntry, error::RemoteError};

pub mod controller;
pub mod view;

pub use controller::{
    Connectivity, MessageTone, StatusMessage, SubmissionPhase, SubmissionState, SubmitOutcome,
    SubmitTicket, WaitlistController,
};
pub use view::FormView;

/// Remote operations the form controller depends on.
#[async_trait]
pub trait WaitlistGateway: Send + Sync {
    async fn probe_connectivity(&self) -> ConnectivityResult;
    async fn create_entry(&self, entry: &WaitlistEntry) -> Result<CreatedEntry, RemoteError>;
}

#[async_trait]
impl WaitlistGateway for WaitlistBackend {
    async fn probe_connectivity(&self) -> ConnectivityResult {
        WaitlistBackend::probe_connectivity(self).await
    }

    async fn create_entry(&self, entry: &WaitlistEntry) -> Result<CreatedEntry, RemoteError> {
        WaitlistBackend::create_entry(self, entry).await
    }
}
