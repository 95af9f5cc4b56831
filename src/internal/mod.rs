// SPDX-License-Identifier: MPL-2.0

//! Non exposed modules.

pub mod arena;
pub mod closure;
pub mod context;
pub mod multiples;
