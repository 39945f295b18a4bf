use super::{
    ApiExecutor, ApiValidator, DescriptorValidator, ExecutionError, ExecutionMetadata,
    ExecutionRequest, FormattedResponse, ResponseFormatter, SimulatedExecutor,
};
use crate::clock::{Clock, SystemClock};
use crate::store::ApiRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Ties the execution collaborators together for stored APIs.
pub struct ExecutionService<R: ApiRepository> {
    repository: R,
    validator: Box<dyn ApiValidator>,
    executor: Box<dyn ApiExecutor>,
    formatter: ResponseFormatter,
    clock: Arc<dyn Clock>,
}

impl<R: ApiRepository> ExecutionService<R> {
    /// Service with the descriptor-driven validator and the simulated executor.
    pub fn simulated(repository: R) -> Self {
        Self::simulated_with_clock(repository, Arc::new(SystemClock))
    }

    pub fn simulated_with_clock(repository: R, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            repository,
            Box::new(DescriptorValidator::new(Arc::clone(&clock))),
            Box::new(SimulatedExecutor),
            clock,
        )
    }

    pub fn new(
        repository: R,
        validator: Box<dyn ApiValidator>,
        executor: Box<dyn ApiExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            validator,
            executor,
            formatter: ResponseFormatter,
            clock,
        }
    }

    pub fn execute(
        &self,
        api_code: &str,
        request: &ExecutionRequest,
    ) -> Result<FormattedResponse, ExecutionError> {
        let descriptor = self
            .repository
            .find_by_code(api_code)?
            .ok_or_else(|| ExecutionError::NotFound {
                api_code: api_code.to_string(),
            })?;
        if !descriptor.is_active {
            return Err(ExecutionError::Inactive {
                api_code: api_code.to_string(),
            });
        }

        if let Err(e) = self.validator.validate(&descriptor, request) {
            warn!(api_code, client = %request.client_id, error = %e, "request rejected");
            return Err(e);
        }

        let started = self.clock.now();
        let data = self.executor.execute(&descriptor, request)?;
        let finished = self.clock.now();
        let meta = ExecutionMetadata {
            executed_at: started,
            execution_time_ms: (finished - started).num_milliseconds(),
        };
        let response = self.formatter.format(&descriptor, data, &meta);

        self.repository.record_call(api_code, finished)?;
        info!(api_code, client = %request.client_id, "API executed");
        Ok(response)
    }
}
