mod config;
pub use config::RemoteConfig;

mod errors;
pub use errors::HttpRemoteError;

mod http;
pub use http::HttpRemote;
