//! Peer counts per ASN
//!
//! Counts are exact. The display name of an ASN is the name carried by the
//! first resolved peer with that ASN; later peers never override it.

use std::collections::HashMap;

use crate::types::{Asn, AsnSummary, ResolvedPeer};

/// Fold resolved peers into per-ASN counts, sorted by count descending
///
/// Ties keep the order in which each ASN was first seen.
pub fn aggregate(resolved: &[ResolvedPeer]) -> Vec<AsnSummary> {
    let mut index: HashMap<Asn, usize> = HashMap::new();
    let mut summaries: Vec<AsnSummary> = Vec::new();

    for peer in resolved {
        match index.get(&peer.asn) {
            Some(&i) => summaries[i].count += 1,
            None => {
                index.insert(peer.asn, summaries.len());
                summaries.push(AsnSummary {
                    asn: peer.asn,
                    name: peer.name.clone(),
                    count: 1,
                });
            }
        }
    }

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

/// Total peers across all summaries
pub fn total_count(summaries: &[AsnSummary]) -> usize {
    summaries.iter().map(|s| s.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn resolved(asn: u32, name: &str) -> ResolvedPeer {
        ResolvedPeer {
            ip: IpAddr::V4(Ipv4Addr::new(192, 0, 2, (asn % 250) as u8)),
            asn: Asn(asn),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_aggregate_example() {
        let peers = vec![
            resolved(100, "ExampleOrgLongName"),
            resolved(200, "Short"),
            resolved(100, "ExampleOrgLongName"),
            resolved(100, "ExampleOrgLongName"),
        ];

        let summaries = aggregate(&peers);

        assert_eq!(
            summaries,
            vec![
                AsnSummary {
                    asn: Asn(100),
                    name: "ExampleOrgLongName".to_string(),
                    count: 3
                },
                AsnSummary {
                    asn: Asn(200),
                    name: "Short".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_first_seen_name_wins() {
        let peers = vec![
            resolved(300, "First"),
            resolved(300, "Second"),
            resolved(300, "Second"),
        ];
        let summaries = aggregate(&peers);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "First");
        assert_eq!(summaries[0].count, 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let peers = vec![resolved(7, "G"), resolved(5, "E"), resolved(9, "I")];
        let asns: Vec<u32> = aggregate(&peers).iter().map(|s| s.asn.0).collect();
        assert_eq!(asns, vec![7, 5, 9]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
        assert_eq!(total_count(&[]), 0);
    }

    proptest! {
        #[test]
        fn prop_counts_sum_to_resolved(asns in prop::collection::vec(0u32..20, 0..200)) {
            let peers: Vec<ResolvedPeer> = asns.iter().map(|a| resolved(*a, "X")).collect();
            let summaries = aggregate(&peers);
            prop_assert_eq!(total_count(&summaries), peers.len());
        }

        #[test]
        fn prop_sorted_descending(asns in prop::collection::vec(0u32..20, 0..200)) {
            let peers: Vec<ResolvedPeer> = asns.iter().map(|a| resolved(*a, "X")).collect();
            let summaries = aggregate(&peers);
            for pair in summaries.windows(2) {
                prop_assert!(pair[0].count >= pair[1].count);
            }
        }

        #[test]
        fn prop_one_summary_per_asn(asns in prop::collection::vec(0u32..20, 0..200)) {
            let peers: Vec<ResolvedPeer> = asns.iter().map(|a| resolved(*a, "X")).collect();
            let summaries = aggregate(&peers);
            let mut distinct = asns.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(summaries.len(), distinct.len());
        }
    }
}
