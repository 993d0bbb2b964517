use crate::error::ServiceError;
use crate::protocol::{DetailQuery, DetailRecord, LocationPage, LocationQuery};

/// The remote search/detail backend.
///
/// Futures are not required to be `Send`: the browser client runs on the
/// single wasm thread and the CLI polls everything from one task.
#[allow(async_fn_in_trait)]
pub trait SearchService {
    async fn locations(&self, query: &LocationQuery) -> Result<LocationPage, ServiceError>;

    /// `Ok(None)` when the service has no detail for the place.
    async fn detail(&self, query: &DetailQuery) -> Result<Option<DetailRecord>, ServiceError>;
}

impl<S: SearchService + ?Sized> SearchService for &S {
    async fn locations(&self, query: &LocationQuery) -> Result<LocationPage, ServiceError> {
        (**self).locations(query).await
    }

    async fn detail(&self, query: &DetailQuery) -> Result<Option<DetailRecord>, ServiceError> {
        (**self).detail(query).await
    }
}
