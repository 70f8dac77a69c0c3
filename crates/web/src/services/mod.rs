//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Email/password accounts and Google sign-in
//! - `inventory` - Product CRUD and snapshot streams
//! - `sales` - Recording, importing, and streaming sales
//! - `checkout` - Point-of-sale checkout against stock
//! - `chat` - The AI business assistant
//! - `analytics` - Dashboard insights from Gemini
//! - `trend` - Monthly product-trend ideas
//! - `studio` - Marketing images and copy from product photos
//! - `realtime` - Change notification behind every stream

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod checkout;
pub mod inventory;
pub mod realtime;
pub mod sales;
pub mod studio;
pub mod trend;

pub use analytics::{AnalyticsService, Insights};
pub use auth::{AuthError, AuthService};
pub use chat::{ChatError, ChatService, PendingReplies};
pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService};
pub use inventory::{InventoryError, InventoryService};
pub use realtime::{ChangeHub, Collection};
pub use sales::{SalesError, SalesService};
pub use studio::{ImageBackend, StudioResult, StudioService};
pub use trend::{TrendCache, TrendError, TrendQuery, TrendService};
