// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod combine;
pub mod randomize;
pub mod to_csv;
pub mod union;

pub use combine::combine_command;
pub use randomize::randomize_command;
pub use to_csv::csv_command;
pub use union::union_command;
