// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod devices;
pub mod error;
pub mod module;
pub mod permissions;
pub mod promise;
pub mod scope;
pub mod types;
pub mod ui;
pub mod views;

pub use devices::*;
pub use error::*;
pub use module::*;
pub use permissions::*;
pub use promise::*;
pub use scope::*;
pub use types::*;
pub use ui::*;
pub use views::*;
