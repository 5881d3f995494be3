//! Ticket issuance: format, seed determinism, and body uniqueness.

use supportdesk_core::policy::{PolicyStore, StaticPolicyStore};
use supportdesk_core::remedy::RemedyOrchestrator;
use supportdesk_core::tickets::{TicketIssuer, TicketKind};

#[test]
fn tickets_are_prefix_plus_six_digits() {
    let mut issuer = TicketIssuer::new(7);
    for (kind, prefix) in [
        (TicketKind::Block, "BLK"),
        (TicketKind::Dispute, "CCB"),
        (TicketKind::Escalation, "ESC"),
    ] {
        let ticket = issuer.issue(kind);
        assert!(ticket.starts_with(prefix), "got {ticket}");
        let body = &ticket[prefix.len()..];
        assert_eq!(body.len(), 6);
        let n: u64 = body.parse().expect("numeric body");
        assert!((100_000..=999_999).contains(&n));
    }
}

#[test]
fn same_seed_yields_the_same_sequence() {
    let mut a = TicketIssuer::new(0x5EED);
    let mut b = TicketIssuer::new(0x5EED);
    for _ in 0..20 {
        assert_eq!(a.issue(TicketKind::Block), b.issue(TicketKind::Block));
    }
}

#[test]
fn bodies_never_repeat_within_one_issuer() {
    let mut issuer = TicketIssuer::new(42);
    let mut seen = std::collections::HashSet::new();
    for i in 0..500 {
        let kind = match i % 3 {
            0 => TicketKind::Block,
            1 => TicketKind::Dispute,
            _ => TicketKind::Escalation,
        };
        let ticket = issuer.issue(kind);
        let body = ticket[3..].to_string();
        assert!(seen.insert(body), "duplicate body in {ticket}");
    }
}

#[test]
fn escalation_tickets_come_from_the_same_stream() {
    let mut remedies = RemedyOrchestrator::new(9);
    let ticket = remedies.escalation_ticket();
    assert!(ticket.starts_with("ESC"));
    assert_eq!(ticket.len(), 9);
}

#[test]
fn published_ticket_format_matches_issued_tickets() {
    let policies = StaticPolicyStore::default();
    let format = policies.ticket_format(TicketKind::Dispute);
    assert_eq!(format.prefix, "CCB");
    assert_eq!(format.digits, 6);

    let mut issuer = TicketIssuer::new(1);
    let ticket = issuer.issue(TicketKind::Dispute);
    assert!(ticket.starts_with(&format.prefix));
    assert_eq!(ticket.len(), format.prefix.len() + format.digits as usize);
}

#[test]
fn escalation_ladder_runs_agent_to_ombudsman() {
    let policies = StaticPolicyStore::default();
    let ladder = policies.escalation();
    assert_eq!(ladder.levels.len(), 4);
    assert_eq!(ladder.levels[0].owner, "Senior Support Agent");
    assert_eq!(ladder.levels[3].owner, "Banking Ombudsman");
}
