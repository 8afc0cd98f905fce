pub mod fetch;
pub mod url;

pub use fetch::{DownloadTarget, FetchOutcome, Fetcher, HubTransport, Transport};
pub use url::RepoFile;
