mod common;

use std::time::Duration;

use common::{FakeLauncher, Site};
use coupon_watch::browser::{BrowserSession, LaunchConfig, PageConfig};
use coupon_watch::error::{AppError, BrowserError};
use coupon_watch::infrastructure::{RetryPolicy, SessionManager};

fn manager(launcher: FakeLauncher, max_attempts: u32) -> SessionManager<FakeLauncher> {
    SessionManager::new(
        launcher,
        LaunchConfig::default(),
        PageConfig::default(),
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
        },
    )
}

#[tokio::test]
async fn test_acquire_succeeds_after_transient_failures() {
    let launcher = FakeLauncher::new(Site::default()).failing(2);
    let counters = launcher.counters.clone();
    let sessions = manager(launcher, 3);

    let session = sessions.acquire().await.expect("第三次应该成功");
    assert_eq!(counters.launches(), 3);
    assert!(!session.is_closed());

    sessions.release(session).await;
    assert_eq!(counters.closes(), 1);
}

#[tokio::test]
async fn test_acquire_gives_up_after_max_attempts() {
    let launcher = FakeLauncher::new(Site::default()).failing(5);
    let counters = launcher.counters.clone();
    let sessions = manager(launcher, 3);

    let err = sessions.acquire().await.err().expect("应该失败");
    assert_eq!(counters.launches(), 3);
    match err {
        AppError::LaunchExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(matches!(source, BrowserError::LaunchFailed { reason } if reason.contains("#3")));
        }
        other => panic!("意外的错误: {other}"),
    }
}

#[tokio::test]
async fn test_zero_attempts_still_tries_once() {
    let launcher = FakeLauncher::new(Site::default());
    let counters = launcher.counters.clone();
    let sessions = manager(launcher, 0);

    let mut session = sessions.acquire().await.unwrap();
    assert_eq!(counters.launches(), 1);
    session.close().await.unwrap();
    session.close().await.unwrap();
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_configure_failure_closes_browser_and_counts_as_attempt() {
    let launcher = FakeLauncher::new(Site::default()).failing_configure(3);
    let counters = launcher.counters.clone();
    let sessions = SessionManager::new(
        launcher,
        LaunchConfig::default(),
        PageConfig::default(),
        RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        },
    );

    let start = tokio::time::Instant::now();
    let err = sessions.acquire().await.err().expect("应该失败");

    // 只在两次尝试之间等待，最后一次失败后不再等待
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(counters.launches(), 3);
    assert_eq!(counters.closes(), 3);
    assert!(matches!(
        err,
        AppError::LaunchExhausted {
            attempts: 3,
            source: BrowserError::PageSetupFailed { .. }
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_delay_between_attempts() {
    let launcher = FakeLauncher::new(Site::default()).failing(1).failing_configure(1);
    let counters = launcher.counters.clone();
    let sessions = SessionManager::new(
        launcher,
        LaunchConfig::default(),
        PageConfig::default(),
        RetryPolicy {
            max_attempts: 4,
            retry_delay: Duration::from_secs(5),
        },
    );

    let start = tokio::time::Instant::now();
    let session = sessions.acquire().await.expect("第三次应该成功");

    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(counters.launches(), 3);
    // 配置失败的那次被关闭，成功的会话仍然打开
    assert_eq!(counters.closes(), 1);
    assert!(!session.is_closed());
}
