// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

#![allow(dead_code)]

use contact_intake::validator::ContactSubmission;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client identifiers for testing.
pub fn generate_clients(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// A well-formed human submission.
pub fn human_submission(i: usize) -> ContactSubmission {
    ContactSubmission {
        name: Some(format!("Visitor {i}")),
        email: Some(format!("visitor{i}@example.org")),
        message: Some(format!("Hello, this is message number {i}.")),
        hp: Some(String::new()),
    }
}

/// A bot submission that filled in the honeypot.
pub fn bot_submission(i: usize) -> ContactSubmission {
    ContactSubmission {
        hp: Some(format!("https://spam-{i}.example/offer")),
        ..human_submission(i)
    }
}

/// A submission with a syntactically broken email.
pub fn malformed_submission(i: usize) -> ContactSubmission {
    let emails = generate_malformed_emails();
    ContactSubmission {
        email: Some(emails[i % emails.len()].to_string()),
        ..human_submission(i)
    }
}

/// Generate malformed email variations for testing.
/// Each one should fail the syntax check:
/// - no `@` or more than one `@`
/// - empty local part or domain label
/// - no dot in the domain, or a dot at its edges
/// - embedded whitespace
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "not-an-email",
        "plainaddress",
        "@example.com",
        "user@",
        "user@example",
        "user@.com",
        "user@example.",
        "user@@example.com",
        "us@er@example.com",
        "user name@example.com",
        "user@exa mple.com",
        "user@example.com ",
        "\tuser@example.com",
    ]
}

/// Generate unusual but syntactically acceptable addresses.
pub fn generate_permissive_emails() -> Vec<&'static str> {
    vec![
        "a@b.co",
        "first.last+tag@sub.example.co.uk",
        "x@y.z",
        "user@localhost.localdomain",
        "üser@exämple.de",
        "\"quoted\"@example.com",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_clients() {
        let clients = generate_clients(256);
        assert_eq!(clients.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = clients.iter().collect();
        assert_eq!(unique.len(), 256);
    }
}
