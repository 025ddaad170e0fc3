use bytesize::ByteSize;
use comfy_table::{
    Cell, CellAlignment, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};
use eyre_pretty::{Context, Result};
use nswfmt::{
    aset::{Aset, TABLE_SIZE},
    nacp::Nacp,
    nro::{Header, Nro, Segment},
};
use std::path::PathBuf;

fn segment_table(header: &Header) {
    let mut segments = Table::new();
    segments
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Segment").set_alignment(CellAlignment::Center),
            Cell::new("Offset").set_alignment(CellAlignment::Center),
            Cell::new("Length").set_alignment(CellAlignment::Center),
            Cell::new("Length (Bytes)").set_alignment(CellAlignment::Center),
        ]);

    let mut row = |name: &str, segment: Segment| {
        segments.add_row(vec![
            Cell::new(name),
            Cell::new(format!("0x{:08X}", segment.offset)),
            Cell::new(format!("0x{:08X}", segment.size)),
            Cell::new(format!("{}", ByteSize(u64::from(segment.size)).display()))
                .set_alignment(CellAlignment::Center),
        ]);
    };

    row(".text", header.text);
    row(".ro", header.ro);
    row(".data", header.data);

    if header.bss_size != 0 {
        segments.add_row(vec![
            Cell::new(".bss"),
            Cell::new("-").set_alignment(CellAlignment::Center),
            Cell::new(format!("0x{:08X}", header.bss_size)),
            Cell::new(format!("{}", ByteSize(u64::from(header.bss_size)).display()))
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{segments}");
}

fn asset_table(asset: &Aset) {
    let mut payloads = Table::new();
    payloads
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Payload").set_alignment(CellAlignment::Center),
            Cell::new("Offset").set_alignment(CellAlignment::Center),
            Cell::new("Length").set_alignment(CellAlignment::Center),
            Cell::new("Length (Bytes)").set_alignment(CellAlignment::Center),
        ]);

    let mut cursor = TABLE_SIZE;
    let mut row = |name: &str, payload: &[u8]| {
        if payload.is_empty() {
            payloads.add_row(vec![
                Cell::new(name),
                Cell::new("-").set_alignment(CellAlignment::Center),
                Cell::new("-").set_alignment(CellAlignment::Center),
                Cell::new("-").set_alignment(CellAlignment::Center),
            ]);
            return;
        }

        payloads.add_row(vec![
            Cell::new(name),
            Cell::new(format!("0x{cursor:08X}")),
            Cell::new(format!("0x{:08X}", payload.len())),
            Cell::new(format!("{}", ByteSize(payload.len() as u64).display()))
                .set_alignment(CellAlignment::Center),
        ]);
        cursor += payload.len() as u64;
    };

    row("icon", &asset.icon);
    row("nacp", &asset.nacp);
    row("romfs", &asset.romfs);

    println!("{payloads}");
}

fn nacp_table(record: &Nacp) -> Result<()> {
    let mut properties = Table::new();
    properties
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Property").set_alignment(CellAlignment::Center),
            Cell::new("Value").set_alignment(CellAlignment::Center),
        ]);

    properties.add_row(vec![
        Cell::new("Name"),
        Cell::new(record.name().context("decoding name")?),
    ]);

    properties.add_row(vec![
        Cell::new("Author"),
        Cell::new(record.author().context("decoding author")?),
    ]);

    properties.add_row(vec![
        Cell::new("Version"),
        Cell::new(record.version().context("decoding version")?),
    ]);

    println!("{properties}");

    Ok(())
}

pub fn inspect_nro(input: PathBuf) -> Result<()> {
    let nro = Nro::open(&input).context("opening file")?;

    let mut info = Table::new();
    info.load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new(format!(
                "{} ({})",
                input.file_name().unwrap().to_string_lossy(),
                ByteSize(nro.to_bytes().len() as u64).display()
            )),
            Cell::new(format!(
                "Image: 0x{:08X} ({})",
                nro.header.size,
                ByteSize(u64::from(nro.header.size)).display()
            )),
        ]);

    println!("{info}");

    let mut properties = Table::new();
    properties
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Property").set_alignment(CellAlignment::Center),
            Cell::new("Value").set_alignment(CellAlignment::Center),
        ]);

    properties.add_row(vec![
        Cell::new("Version"),
        Cell::new(format!("0x{:08X}", nro.header.version)),
    ]);

    properties.add_row(vec![
        Cell::new("Flags"),
        Cell::new(format!("0x{:08X}", nro.header.flags)),
    ]);

    properties.add_row(vec![
        Cell::new("Module Id"),
        Cell::new(
            nro.header
                .module_id
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<String>(),
        ),
    ]);

    println!("{properties}");
    segment_table(&nro.header);

    if let Some(asset) = &nro.asset {
        let mut info = Table::new();
        info.load_preset(comfy_table::presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![Cell::new("Asset Section")]);

        println!("{info}");
        asset_table(asset);

        if !asset.nacp.is_empty() {
            nacp_table(&Nacp::new(asset.nacp.clone()))?;
        }
    }

    Ok(())
}
