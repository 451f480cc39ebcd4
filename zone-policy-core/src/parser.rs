use tracing::{debug, trace};

use crate::catalog::{Capture, Catalog};
use crate::model::Zone;

/// Parse raw configuration text into zones, in first-seen order.
///
/// Lines no descriptor matches are skipped; parsing never fails.
pub fn parse(text: &str) -> Vec<Zone> {
    parse_lines(text.lines())
}

/// Parse an ordered sequence of configuration lines.
pub fn parse_lines<'a, I>(lines: I) -> Vec<Zone>
where
    I: IntoIterator<Item = &'a str>,
{
    parse_with_catalog(Catalog::zone_policy(), lines)
}

pub(crate) fn parse_with_catalog<'a, I>(catalog: &Catalog, lines: I) -> Vec<Zone>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut zones: Vec<Zone> = Vec::new();
    let mut skipped = 0usize;

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some(matched) = catalog.match_line(line) else {
            trace!(line, "no descriptor matched");
            skipped += 1;
            continue;
        };

        if matched.capture == Capture::RemoveZone {
            let before = zones.len();
            zones.retain(|zone| zone.name != matched.zone);
            if zones.len() != before {
                debug!(zone = %matched.zone, "zone retired by delete line");
            }
            continue;
        }

        let index = match zones.iter().position(|zone| zone.name == matched.zone) {
            Some(index) => index,
            // Only shared descriptors may establish a zone from an empty value.
            None if !matched.shared && matched.capture.is_empty() => {
                trace!(line, "empty value does not establish a zone");
                skipped += 1;
                continue;
            }
            None => {
                zones.push(Zone::new(matched.zone.clone()));
                zones.len() - 1
            }
        };
        let zone = &mut zones[index];
        trace!(zone = %zone.name, field = %matched.field, "matched");
        matched.capture.merge_into(zone);
    }

    debug!(zones = zones.len(), skipped, "parsed configuration");
    zones
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::model::{Afi, DefaultAction, TrafficRule};

    #[test]
    fn accumulates_fields_per_zone() {
        let zones = parse(
            "set zone-policy zone LAN default-action 'drop'\n\
             set zone-policy zone LAN interface 'eth1'\n\
             set zone-policy zone LAN interface 'eth2'\n\
             set zone-policy zone WAN interface 'eth0'\n\
             set zone-policy zone LAN from WAN firewall name 'WAN-LAN'\n",
        );

        assert_eq!(zones.len(), 2);
        let lan = &zones[0];
        assert_eq!(lan.name, "LAN");
        assert_eq!(lan.default_action, Some(DefaultAction::Drop));
        assert_eq!(lan.interface_list(), ["eth1", "eth2"]);
        assert_eq!(lan.rules(), [TrafficRule::new("WAN", Afi::Ipv4, "WAN-LAN")]);
        assert_eq!(zones[1].name, "WAN");
    }

    #[test]
    fn duplicate_interface_lines_collapse() {
        let zones = parse(
            "set zone-policy zone LAN interface eth1\nset zone-policy zone LAN interface eth1\n",
        );
        assert_eq!(zones[0].interface_list(), ["eth1"]);
    }

    #[test]
    fn delete_line_retires_zone() {
        let zones = parse(
            "set zone-policy zone LAN interface eth1\n\
             set zone-policy zone DMZ interface eth2\n\
             delete zone-policy zone LAN\n",
        );
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name, "DMZ");
    }

    #[test]
    fn empty_description_alone_does_not_create_zone() {
        let zones = parse("set zone-policy zone LAN description ''\n");
        assert!(zones.is_empty());

        let zones = parse(
            "set zone-policy zone LAN interface eth1\nset zone-policy zone LAN description ''\n",
        );
        assert_eq!(zones[0].description.as_deref(), Some(""));
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let zones = parse(
            "set zone-policy zone\n\
             set zone-policy zone LAN from WAN firewall\n\
             set interfaces ethernet eth0 address dhcp\n\
             garbage\n",
        );
        assert!(zones.is_empty());
    }
}
