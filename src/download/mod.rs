pub mod dataset;
pub mod http;
pub mod progress;

pub use dataset::Dataset;
pub use http::HttpDownloader;
pub use progress::DownloadProgress;
