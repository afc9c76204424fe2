//! ブラウザセッション (Chrome DevTools Protocol)

mod session;

pub use session::BrowserSession;
