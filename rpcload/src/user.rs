//! Virtual users
//!
//! A virtual user is one concurrent task repeatedly interacting with the endpoint until its
//! deadline. The deadline is taken when the task starts.
use crate::driver::{OneShot, StreamDriver};
use crate::worker::Plan;
use std::sync::Arc;
use tokio::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Issue requests back-to-back until the deadline passes.
///
/// The deadline is only checked between requests, so the last request may complete after it.
pub(crate) async fn request_loop<D: OneShot>(driver: Arc<D>, plan: Arc<Plan>) {
    let deadline = Instant::now() + plan.descriptor.duration;
    let method = plan.descriptor.method;

    let mut id = 1;
    while Instant::now() < deadline {
        let outcome = driver.call(method.request(id)).await;
        plan.sink.push(outcome);
        id += 1;
    }

    trace!("Virtual user finished after {} requests", id - 1);
    plan.progress.advance();
}

/// Hold a single subscription open until the deadline passes.
pub(crate) async fn subscription(driver: Arc<StreamDriver>, plan: Arc<Plan>) {
    let deadline = Instant::now() + plan.descriptor.duration;
    let request = plan.descriptor.method.request(1);

    driver
        .run(request, Some(deadline), |outcome| {
            plan.sink.push(outcome);
            plan.progress.advance();
        })
        .await;
}
