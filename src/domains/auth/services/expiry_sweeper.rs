use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use crate::domains::auth::services::AuthService;

const MIN_PERIOD: Duration = Duration::from_secs(1);

/// 만료 세션/링크 정리 스케줄러
/// Expiry Sweep Scheduler
///
/// 역할:
/// - 주기적으로 만료된 세션을 Revoked 상태로 전환
/// - 만료된 인증/초대/재설정 링크 삭제
/// - 활성화/비활성화 제어 가능
#[derive(Clone)]
pub struct ExpirySweeper {
    auth_service: AuthService,
    period: Duration,
    enabled: Arc<AtomicBool>,
}

impl ExpirySweeper {
    /// 새 스케줄러 생성
    /// Create new scheduler; a zero period is raised to one second
    pub fn new(auth_service: AuthService, period: Duration) -> Self {
        Self {
            auth_service,
            // tokio interval 은 0 주기에서 panic
            period: period.max(MIN_PERIOD),
            enabled: Arc::new(AtomicBool::new(true)), // 기본값: 활성화
        }
    }

    /// 스케줄러 시작
    /// Start scheduler in the background
    pub fn start(&self) -> JoinHandle<()> {
        let sweeper = self.clone();

        tokio::spawn(async move {
            let mut interval = interval(sweeper.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                if !sweeper.is_enabled() {
                    continue;
                }

                sweeper.run_once().await;
            }
        })
    }

    /// 정리 1회 실행
    /// Run a single sweep; failures are logged and retried on the next tick
    pub async fn run_once(&self) {
        match self.auth_service.sweep_expired().await {
            Ok(report) => {
                if report.sessions_revoked > 0 || report.links_deleted > 0 {
                    tracing::info!(
                        sessions_revoked = report.sessions_revoked,
                        links_deleted = report.links_deleted,
                        "expiry sweep completed"
                    );
                }
            }
            Err(e) => tracing::error!(error = %e, "expiry sweep failed"),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 스케줄러 활성화
    /// Enable scheduler
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// 스케줄러 비활성화
    /// Disable scheduler
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// 스케줄러 상태 조회
    /// Get scheduler status
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
