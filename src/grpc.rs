//! The protobuf facade over a running [`Coordinator`]: seed new URLs and
//! read pool/queue counters. RPCs never block on a scrape — `Enqueue`
//! only pushes to the frontier, the coordinator's own driver loop does
//! the rest.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::coordinator::Coordinator;
use crate::proto::crawl_coordinator_server::CrawlCoordinator;
use crate::proto::{
    EnqueueRequest, EnqueueResponse, ResponseStatus, StatsRequest, StatsResponse,
};

pub struct CrawlCoordinatorService {
    coordinator: Arc<Coordinator>,
}

impl CrawlCoordinatorService {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator }
    }
}

#[tonic::async_trait]
impl CrawlCoordinator for CrawlCoordinatorService {
    async fn enqueue(
        &self,
        request: Request<EnqueueRequest>,
    ) -> Result<Response<EnqueueResponse>, Status> {
        let url = &request.get_ref().url;
        match self.coordinator.frontier().push(url).await {
            Ok(()) => Ok(Response::new(EnqueueResponse {
                status: ResponseStatus::Ok.into(),
                message: None,
            })),
            Err(error) => Err(Status::aborted(error.to_string())),
        }
    }

    async fn stats(
        &self,
        _request: Request<StatsRequest>,
    ) -> Result<Response<StatsResponse>, Status> {
        Ok(Response::new(StatsResponse {
            status: ResponseStatus::Ok.into(),
            message: None,
            pool_size: self.coordinator.pool_size() as u32,
            pool_in_use: self.coordinator.pool_in_use() as u32,
        }))
    }
}
