//! Client-side OpenID-Connect session manager—config discovery, session bootstrap
//! with redirect-callback handling, silent re-auth with permanent fallback memory,
//! periodic revalidation, and refresh scheduling in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod idp;
pub mod obs;
pub mod prefs;
pub mod redirect;
pub mod session;

#[cfg(any(test, feature = "test"))] pub mod _preludet;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
