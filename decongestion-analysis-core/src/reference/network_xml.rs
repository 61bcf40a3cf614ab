use std::{collections::HashMap, io::BufRead};

use geo_types::{Coord, LineString};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use uom::si::{
    f64::{Length, Velocity},
    length::meter,
    velocity::meter_per_second,
};

use super::LinkAttributes;

/// reads the links of a MATSim network file. nodes must precede the links
/// that reference them, as MATSim writes them. link geometry is the straight
/// line between its two nodes.
pub fn read_links<R: BufRead>(inner: R) -> Result<Vec<LinkAttributes>, String> {
    let mut reader = quick_xml::Reader::from_reader(inner);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut nodes: HashMap<String, Coord<f64>> = HashMap::new();
    let mut links = Vec::new();

    loop {
        buf.clear();
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Empty(e)) | Ok(XmlEvent::Start(e)) => match e.name().as_ref() {
                b"node" => {
                    let (id, coord) =
                        decode_node(&e).map_err(|m| format!("node at byte {position}: {m}"))?;
                    nodes.insert(id, coord);
                }
                b"link" => {
                    let link = decode_link(&e, &nodes)
                        .map_err(|m| format!("link at byte {position}: {m}"))?;
                    links.push(link);
                }
                _ => {}
            },
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("invalid XML at byte {position}: {e}")),
        }
    }
    log::debug!("read {} nodes and {} links", nodes.len(), links.len());
    Ok(links)
}

fn attributes(element: &BytesStart) -> Result<HashMap<String, String>, String> {
    let mut result = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| format!("invalid attribute: {e}"))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| format!("invalid value for '{key}': {e}"))?;
        result.insert(key, value.into_owned());
    }
    Ok(result)
}

fn text<'a>(attrs: &'a HashMap<String, String>, name: &str) -> Result<&'a str, String> {
    attrs
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing '{name}' attribute"))
}

fn number(attrs: &HashMap<String, String>, name: &str) -> Result<f64, String> {
    let raw = text(attrs, name)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|e| format!("'{name}' value '{raw}' is not a number: {e}"))
}

fn decode_node(element: &BytesStart) -> Result<(String, Coord<f64>), String> {
    let attrs = attributes(element)?;
    let id = text(&attrs, "id")?.to_string();
    let coord = Coord {
        x: number(&attrs, "x")?,
        y: number(&attrs, "y")?,
    };
    Ok((id, coord))
}

fn decode_link(
    element: &BytesStart,
    nodes: &HashMap<String, Coord<f64>>,
) -> Result<LinkAttributes, String> {
    let attrs = attributes(element)?;
    let link_id = text(&attrs, "id")?.to_string();
    let from_node = text(&attrs, "from")?.to_string();
    let to_node = text(&attrs, "to")?.to_string();
    let from = nodes
        .get(&from_node)
        .ok_or_else(|| format!("link '{link_id}' references unknown node '{from_node}'"))?;
    let to = nodes
        .get(&to_node)
        .ok_or_else(|| format!("link '{link_id}' references unknown node '{to_node}'"))?;
    let modes = attrs
        .get("modes")
        .map(|m| {
            m.split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(LinkAttributes {
        length: Length::new::<meter>(number(&attrs, "length")?),
        freespeed: Velocity::new::<meter_per_second>(number(&attrs, "freespeed")?),
        capacity: number(&attrs, "capacity")?,
        lanes: number(&attrs, "permlanes")?,
        modes,
        geometry: LineString::new(vec![*from, *to]),
        link_id,
        from_node,
        to_node,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const NETWORK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE network SYSTEM "http://www.matsim.org/files/dtd/network_v2.dtd">
<network>
    <nodes>
        <node id="a" x="0.0" y="0.0" />
        <node id="b" x="1000.0" y="0.0" />
        <node id="c" x="1000.0" y="500.0" >
            <attributes>
                <attribute name="type" class="java.lang.String">junction</attribute>
            </attributes>
        </node>
    </nodes>
    <links capperiod="01:00:00" effectivecellsize="7.5" effectivelanewidth="3.75">
        <link id="1" from="a" to="b" length="1000.0" freespeed="10.0" capacity="1800.0" permlanes="1.0" oneway="1" modes="car,ride" />
        <link id="2" from="b" to="c" length="500.0" freespeed="13.89" capacity="3600.0" permlanes="2.0" oneway="1" modes="car,freight,ride" >
            <attributes>
                <attribute name="type" class="java.lang.String">primary</attribute>
            </attributes>
        </link>
    </links>
</network>"#;

    #[test]
    fn test_read_links() {
        let links = read_links(Cursor::new(NETWORK.as_bytes())).expect("network should parse");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].link_id, "1");
        assert_eq!(links[0].length.get::<meter>(), 1000.0);
        assert_eq!(links[0].freespeed.get::<meter_per_second>(), 10.0);
        assert_eq!(links[1].lanes, 2.0);
        assert_eq!(links[1].modes, vec!["car", "freight", "ride"]);
        assert_eq!(
            links[1].geometry,
            LineString::from(vec![(1000.0, 0.0), (1000.0, 500.0)])
        );
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let xml = r#"<network><nodes><node id="a" x="0" y="0"/></nodes><links>
            <link id="1" from="a" to="zz" length="1" freespeed="1" capacity="1" permlanes="1" modes="car"/>
        </links></network>"#;
        let error = read_links(Cursor::new(xml.as_bytes())).unwrap_err();
        assert!(error.contains("unknown node 'zz'"));
    }
}
