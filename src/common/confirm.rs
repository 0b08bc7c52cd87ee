// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Confirmation capability for destructive operations.
//!
//! The apply phases of `assign` and `decommission` take a [`Confirm`]
//! implementation instead of reading stdin directly, so they can be
//! exercised without a terminal.

use std::io::{self, BufRead, Write};

/// Asks the operator to approve a destructive batch.
pub trait Confirm {
    /// Present `prompt` and return whether the operator approved.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Interactive confirmation reading from stdin.
///
/// Approval requires the literal answer `yes`; anything else (including
/// EOF) aborts.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("\n{prompt} ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => answer.trim().eq_ignore_ascii_case("yes"),
        }
    }
}

/// Non-interactive confirmation used by `--yes`.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Create the confirmer matching the `--yes` flag.
pub fn create_confirmer(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysDeny;

    impl Confirm for AlwaysDeny {
        fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_always_confirm() {
        assert!(AlwaysConfirm.confirm("Type 'yes' to confirm:"));
    }

    #[test]
    fn test_deny_impl_via_trait_object() {
        let confirmer: Box<dyn Confirm> = Box::new(AlwaysDeny);
        assert!(!confirmer.confirm("Type 'yes' to confirm:"));
    }

    #[test]
    fn test_create_confirmer_yes_skips_prompt() {
        let confirmer = create_confirmer(true);
        assert!(confirmer.confirm("unused"));
    }
}
