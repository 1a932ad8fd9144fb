pub mod check;
mod group;
pub mod multi;
pub mod report;
pub mod service;


pub use check::{HealthCheck, NopHealthCheck, TimeoutHealthCheck};
pub use multi::MultiHealthCheck;
pub use report::{HealthStatus, ServiceReport, ServiceStatus};
pub use service::ServiceHealthCheck;

// Every concrete checker must satisfy the contract.
#[allow(dead_code)]
const _: () = {
    fn assert_health_check<T: HealthCheck + 'static>() {}

    fn assert_all() {
        assert_health_check::<NopHealthCheck>();
        assert_health_check::<MultiHealthCheck>();
        assert_health_check::<ServiceHealthCheck>();
        assert_health_check::<TimeoutHealthCheck<NopHealthCheck>>();
        assert_health_check::<Box<dyn HealthCheck>>();
    }
};
