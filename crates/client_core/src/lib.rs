//! Client-side core of the energy payment flow: session state, amount rules,
//! contract call encoding and the wallet / persistence seams.

pub mod amount;
pub mod avatar;
pub mod contract;
pub mod flow;
pub mod launch;
pub mod session;
pub mod settings;
pub mod wallet;

pub use amount::AmountSelection;
pub use avatar::{AvatarDescriptor, AvatarProvider, SeededAvatar};
pub use contract::{encode_pay_call, ContractConfig};
pub use flow::{LastTokenStore, MemoryTokenStore, PaymentFlow};
pub use launch::LaunchParams;
pub use session::{SessionController, SessionSnapshot};
pub use settings::{load_settings, normalize_database_url, Settings};
pub use wallet::{wait_for_confirmation, JsonRpcWallet, MissingWallet, Wallet, WalletError};
