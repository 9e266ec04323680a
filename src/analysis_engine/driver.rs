//! 드라이버 중재
//!
//! 시뮬레이션 드라이버와 실시간 브릿지 중 정확히 하나만 패널을 갱신하도록
//! 하는 활성 드라이버 토큰과, 제출 시 드라이버를 선택하는 핸들러입니다.
//! 실시간 이벤트가 도착한 뒤에도 돌고 있는 시뮬레이션 타이머가 패널을
//! 덮어쓰지 못하도록 명시적 토큰으로 중재합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis_engine::events::{FileMeta, OutboundEvent, ProgressSignal};
use crate::analysis_engine::realtime::{RealtimeConnection, RealtimeError};
use crate::analysis_engine::simulation::{SimulationDriver, SimulationSettings};

/// 진행 신호의 출처 드라이버
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// 타이머 기반 합성 진행 (폴백)
    Simulation,
    /// 실시간 채널 이벤트
    Realtime,
}

const ACTIVE_SIMULATION: u8 = 0;
const ACTIVE_REALTIME: u8 = 1;

/// 활성 드라이버 토큰
///
/// 시뮬레이션이 기본 소유자이며, 실시간 드라이버의 첫 진행 이벤트가
/// 영구적으로 소유권을 가져갑니다. 이후 시뮬레이션 신호는 패널 브릿지에서
/// 버려집니다.
#[derive(Debug, Clone)]
pub struct DriverGuard {
    active: Arc<AtomicU8>,
}

impl Default for DriverGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicU8::new(ACTIVE_SIMULATION)),
        }
    }

    /// 실시간 드라이버가 소유권을 가져감. 한 번 가져가면 되돌리지 않음.
    pub fn claim_realtime(&self) {
        if self
            .active
            .compare_exchange(
                ACTIVE_SIMULATION,
                ACTIVE_REALTIME,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
        {
            info!("🔀 realtime driver claimed the progress panel");
        }
    }

    /// 해당 드라이버의 신호를 패널에 적용해도 되는지
    #[must_use]
    pub fn is_active(&self, kind: DriverKind) -> bool {
        let current = self.active.load(Ordering::SeqCst);
        match kind {
            DriverKind::Simulation => current == ACTIVE_SIMULATION,
            DriverKind::Realtime => current == ACTIVE_REALTIME,
        }
    }

    /// 현재 활성 드라이버
    #[must_use]
    pub fn active(&self) -> DriverKind {
        if self.active.load(Ordering::SeqCst) == ACTIVE_REALTIME {
            DriverKind::Realtime
        } else {
            DriverKind::Simulation
        }
    }
}

/// 분석 제출 핸들러
///
/// 업로드 단계는 항상 시뮬레이션으로
/// 표시하고, 이후 실시간 연결이 살아 있으면 `start_analysis`를 전송하며
/// 아니면 전체 처리 시뮬레이션으로 폴백합니다.
pub struct SubmissionHandler<C: RealtimeConnection> {
    connection: Arc<C>,
    signal_tx: tokio::sync::broadcast::Sender<ProgressSignal>,
    guard: DriverGuard,
    settings: SimulationSettings,
}

impl<C: RealtimeConnection> SubmissionHandler<C> {
    #[must_use]
    pub fn new(
        connection: Arc<C>,
        signal_tx: tokio::sync::broadcast::Sender<ProgressSignal>,
        guard: DriverGuard,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            connection,
            signal_tx,
            guard,
            settings,
        }
    }

    /// 분석 시작: 업로드 시뮬레이션 후 실시간 또는 처리 시뮬레이션으로 연결
    ///
    /// 반환된 취소 토큰으로 진행 중인 시뮬레이션을 언제든 중단할 수 있습니다.
    pub async fn start_analysis(&self, files: Vec<FileMeta>) -> Result<CancellationToken, RealtimeError> {
        let driver = SimulationDriver::new(
            files.clone(),
            self.signal_tx.clone(),
            self.settings.clone(),
        );
        let cancel = driver.cancellation_token();

        driver.run_upload().await;

        if self.connection.is_available() {
            info!("📡 realtime channel available, starting live analysis");
            self.connection
                .send(OutboundEvent::StartAnalysis { files })
                .await?;
        } else {
            info!("⏱️ realtime channel unavailable, falling back to simulation");
            driver.run_processing().await;
        }

        Ok(cancel)
    }

    /// 제출 핸들러가 참조하는 활성 드라이버 토큰
    #[must_use]
    pub fn guard(&self) -> &DriverGuard {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_owns_panel_until_realtime_claims() {
        let guard = DriverGuard::new();
        assert!(guard.is_active(DriverKind::Simulation));
        assert!(!guard.is_active(DriverKind::Realtime));

        guard.claim_realtime();
        assert!(guard.is_active(DriverKind::Realtime));
        assert!(!guard.is_active(DriverKind::Simulation));
        assert_eq!(guard.active(), DriverKind::Realtime);

        // 재호출해도 소유권은 그대로
        guard.claim_realtime();
        assert!(guard.is_active(DriverKind::Realtime));
    }
}
