//! Status poller
//!
//! Queries a job's status at a fixed interval until it reaches a terminal
//! state. Queries are strictly sequential: the next one is only issued after
//! the previous response has been classified.

use async_trait::async_trait;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, warn};
use vanity_core::domain::job::{JobHandle, JobStatus, StatusSnapshot};
use vanity_core::domain::vanity::GenerationResult;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// Suspends the poll loop between queries
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Anything that can report the current status of a job
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, handle: &JobHandle) -> Result<StatusSnapshot>;
}

/// Poll-until-terminal loop with a constant interval
#[derive(Debug, Clone)]
pub struct StatusPoller<Z = TokioSleeper> {
    interval: Duration,
    max_attempts: Option<NonZeroU32>,
    sleeper: Z,
}

impl StatusPoller<TokioSleeper> {
    /// Creates an unbounded poller sleeping on the tokio timer
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            sleeper: TokioSleeper,
        }
    }

    /// A `max_attempts` of zero is rejected by [`ClientConfig::validate`]; if
    /// it slips through unvalidated it means no limit.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_attempts: config.max_attempts.and_then(NonZeroU32::new),
            sleeper: TokioSleeper,
        }
    }
}

impl<Z: Sleeper> StatusPoller<Z> {
    /// Replaces the sleeper, e.g. with a recording one in tests
    pub fn with_sleeper<Y: Sleeper>(self, sleeper: Y) -> StatusPoller<Y> {
        StatusPoller {
            interval: self.interval,
            max_attempts: self.max_attempts,
            sleeper,
        }
    }

    /// Stops after `attempts` status queries that were all non-terminal
    pub fn with_max_attempts(mut self, attempts: NonZeroU32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts.map(NonZeroU32::get)
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    /// Polls `handle` until it completes or fails
    ///
    /// * complete: returns the result
    /// * pending/running: sleeps one interval and queries again
    /// * anything else, including bodies that do not decode: fails with
    ///   [`ClientError::Poll`] carrying the raw body
    ///
    /// Transport errors from the source propagate unchanged.
    pub async fn poll_until_done<S>(
        &self,
        source: &S,
        handle: &JobHandle,
    ) -> Result<GenerationResult>
    where
        S: StatusSource + ?Sized,
    {
        info!("Polling job {} every {:?}", handle, self.interval);

        let mut attempts: u32 = 0;
        loop {
            let snapshot = source.fetch_status(handle).await?;
            attempts = attempts.saturating_add(1);

            match snapshot.status {
                Ok(JobStatus::Complete(result)) => {
                    info!("Job {} complete after {} status checks", handle, attempts);
                    return Ok(result);
                }
                Ok(JobStatus::Pending | JobStatus::Running { .. }) => {
                    if let Some(max) = self.max_attempts {
                        if attempts >= max.get() {
                            warn!(
                                "Job {} still running after {} status checks",
                                handle, attempts
                            );
                            return Err(ClientError::AttemptsExhausted {
                                attempts,
                                last_payload: snapshot.raw,
                            });
                        }
                    }
                    debug!("Job {} still searching", handle);
                    self.sleeper.sleep(self.interval).await;
                }
                Ok(status) => {
                    warn!("Job {} ended with status {}", handle, status.as_str());
                    return Err(ClientError::Poll {
                        payload: snapshot.raw,
                    });
                }
                Err(e) => {
                    warn!("Job {} returned an unrecognized status: {}", handle, e);
                    return Err(ClientError::Poll {
                        payload: snapshot.raw,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records requested sleeps and returns immediately
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn recorded(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Serves a fixed sequence of status bodies
    struct ScriptedSource {
        bodies: Mutex<VecDeque<Result<String>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(bodies: Vec<Result<String>>) -> Self {
            Self {
                bodies: Mutex::new(bodies.into()),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn bodies(bodies: &[&str]) -> Self {
            Self::new(bodies.iter().map(|b| Ok(b.to_string())).collect())
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self, handle: &JobHandle) -> Result<StatusSnapshot> {
            self.queries
                .lock()
                .unwrap()
                .push(handle.job_id().to_string());
            let next = self
                .bodies
                .lock()
                .unwrap()
                .pop_front()
                .expect("poller queried past the end of the script");
            next.map(StatusSnapshot::from_body)
        }
    }

    const RUNNING: &str = r#"{"status":"running"}"#;
    const COMPLETE: &str =
        r#"{"status":"complete","result":{"public_key":"Abc123...","private_key":"5Kd..."}}"#;

    fn poller() -> StatusPoller<RecordingSleeper> {
        StatusPoller::new(Duration::from_secs(1))
            .with_sleeper(RecordingSleeper::default())
    }

    fn handle() -> JobHandle {
        JobHandle::new("job-42").unwrap()
    }

    fn expected_result() -> GenerationResult {
        GenerationResult {
            public_key: "Abc123...".to_string(),
            private_key: "5Kd...".to_string(),
        }
    }

    #[tokio::test]
    async fn test_completes_after_two_intervals() {
        let source = ScriptedSource::bodies(&[RUNNING, RUNNING, COMPLETE]);
        let poller = poller();

        let result = poller.poll_until_done(&source, &handle()).await.unwrap();

        assert_eq!(result, expected_result());
        assert_eq!(source.query_count(), 3);
        assert_eq!(
            poller.sleeper().recorded(),
            vec![Duration::from_secs(1); 2]
        );
    }

    #[tokio::test]
    async fn test_immediate_completion_never_sleeps() {
        let source = ScriptedSource::bodies(&[COMPLETE]);
        let poller = poller();

        let result = poller.poll_until_done(&source, &handle()).await.unwrap();

        assert_eq!(result, expected_result());
        assert!(poller.sleeper().recorded().is_empty());
    }

    #[tokio::test]
    async fn test_failure_carries_raw_payload() {
        let failed = r#"{"status":"failed"}"#;
        let source = ScriptedSource::bodies(&[RUNNING, failed]);
        let poller = poller();

        let err = poller
            .poll_until_done(&source, &handle())
            .await
            .unwrap_err();

        match err {
            ClientError::Poll { payload } => assert_eq!(payload, failed),
            other => panic!("expected poll error, got {:?}", other),
        }
        assert_eq!(poller.sleeper().recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_and_error_statuses_are_terminal() {
        for body in [
            r#"{"status":"cancelled"}"#,
            r#"{"status":"error","error":"Operation was canceled"}"#,
        ] {
            let source = ScriptedSource::bodies(&[body]);
            let err = poller()
                .poll_until_done(&source, &handle())
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::Poll { payload } if payload == body));
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_terminal() {
        let source = ScriptedSource::bodies(&[RUNNING, r#"{"error":"Job not found"}"#]);
        let err = poller()
            .poll_until_done(&source, &handle())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Poll { .. }));
        assert_eq!(source.query_count(), 2);
    }

    #[tokio::test]
    async fn test_pending_is_not_terminal() {
        let source = ScriptedSource::bodies(&[r#"{"status":"pending"}"#, RUNNING, COMPLETE]);
        let poller = poller();

        poller.poll_until_done(&source, &handle()).await.unwrap();
        assert_eq!(poller.sleeper().recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_max_attempts_bounds_the_loop() {
        let source = ScriptedSource::bodies(&[RUNNING, RUNNING, RUNNING]);
        let poller = poller().with_max_attempts(NonZeroU32::new(3).unwrap());

        let err = poller
            .poll_until_done(&source, &handle())
            .await
            .unwrap_err();

        match err {
            ClientError::AttemptsExhausted {
                attempts,
                last_payload,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_payload, RUNNING);
            }
            other => panic!("expected attempts exhausted, got {:?}", other),
        }
        assert_eq!(source.query_count(), 3);
        assert_eq!(poller.sleeper().recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_completion_on_last_allowed_attempt() {
        let source = ScriptedSource::bodies(&[RUNNING, COMPLETE]);
        let poller = poller().with_max_attempts(NonZeroU32::new(2).unwrap());

        assert_eq!(
            poller.poll_until_done(&source, &handle()).await.unwrap(),
            expected_result()
        );
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let source = ScriptedSource::new(vec![
            Ok(RUNNING.to_string()),
            Err(ClientError::api_error(503, "unavailable")),
        ]);

        let err = poller()
            .poll_until_done(&source, &handle())
            .await
            .unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits_the_interval() {
        let source = ScriptedSource::bodies(&[RUNNING, RUNNING, COMPLETE]);
        let poller = StatusPoller::new(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        poller.poll_until_done(&source, &handle()).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::default()
            .with_max_attempts(5)
            .with_poll_interval(Duration::from_millis(50));
        let poller = StatusPoller::from_config(&config);
        assert_eq!(poller.interval(), Duration::from_millis(50));
        assert_eq!(poller.max_attempts(), Some(5));
    }

    #[test]
    fn test_zero_max_attempts_in_unvalidated_config_is_unbounded() {
        let mut config = ClientConfig::default();
        config.max_attempts = Some(0);
        assert!(config.validate().is_err());
        assert_eq!(StatusPoller::from_config(&config).max_attempts(), None);
    }

    #[tokio::test]
    async fn test_single_attempt_limit_never_sleeps() {
        let source = ScriptedSource::bodies(&[RUNNING]);
        let poller = poller().with_max_attempts(NonZeroU32::MIN);

        let err = poller
            .poll_until_done(&source, &handle())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::AttemptsExhausted { attempts: 1, .. }));
        assert!(poller.sleeper().recorded().is_empty());
    }
}
