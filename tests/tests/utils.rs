use rpcload::Progress;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter("rpcload=debug,mock_service=debug")
            .try_init();
    });
}

/// Address nothing is listening on.
#[allow(unused)]
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Counts progress notifications.
#[allow(unused)]
#[derive(Default)]
pub struct Ticks(AtomicU64);

#[allow(unused)]
impl Ticks {
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Progress for Ticks {
    fn advance(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}
