use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use ipts_node::{dagjson, ListBuilder, MapBuilder, Node};
use ipts_sdk::{Ipts, IptsConfig, Selection};
use ipts_store::DagStore;
use ipts_table::TIMESTAMP_FIELD;
use ipts_types::{Codec, ContentId};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format.clone();
    let ipts = open(&cli.config, cli.api.as_deref())?;
    match cli.command {
        Command::Put(args) => cmd_put(&ipts, args, &format),
        Command::Get(args) => cmd_get(&ipts, args, &format),
        Command::Block(args) => cmd_block(&ipts, args, &format),
        Command::Floats(args) => cmd_floats(&ipts, args, &format),
        Command::Pipeline(args) => cmd_pipeline(&ipts, args, &format),
        Command::HeadRecord(args) => cmd_head_record(&ipts, args, &format),
        Command::Create(args) => cmd_create(&ipts, args, &format),
        Command::Insert(args) => cmd_insert(&ipts, args, &format),
        Command::Select(args) => cmd_select(&ipts, args, &format),
    }
}

fn open(config_path: &Path, api: Option<&str>) -> anyhow::Result<Ipts> {
    let mut config = IptsConfig::load_or_default(config_path)?;
    if let Some(api) = api {
        config.kubo.api_url = api.to_string();
    }
    tracing::debug!(api = %config.kubo.api_url, "connecting");
    Ok(Ipts::connect(config)?)
}

/// Contents of `path`, or of stdin when `path` is `None` or `-`.
fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_id(label: &str, id: &ContentId, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{} {} {}", "✓".green().bold(), label, id.to_string().yellow()),
        OutputFormat::Json => {
            let node = MapBuilder::new().entry("id", Node::from(id.to_string()))?.build();
            println!("{}", String::from_utf8(dagjson::encode(&node)?)?);
        }
    }
    Ok(())
}

fn print_node(node: &Node, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", format!("{} ({})", node.kind(), node.len()).dimmed());
            println!("{}", dagjson::encode_pretty(node)?);
        }
        OutputFormat::Json => println!("{}", String::from_utf8(dagjson::encode(node)?)?),
    }
    Ok(())
}

fn cmd_put(ipts: &Ipts, args: PutArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let data = read_input(args.file.as_deref())?;
    let id = ipts.store().put(&data, args.input_codec, Codec::DagCbor)?;
    print_id("stored", &id, format)
}

fn cmd_get(ipts: &Ipts, args: GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let node = ipts.get(&args.path)?;
    print_node(&node, format)
}

fn cmd_block(ipts: &Ipts, args: BlockArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let bytes = ipts.block_get(&args.id)?;
    match format {
        OutputFormat::Text => {
            println!("{}", format!("{} bytes", bytes.len()).dimmed());
            print!("{}", hex_dump(&bytes));
            std::io::stdout().flush()?;
        }
        OutputFormat::Json => {
            let node = MapBuilder::new()
                .entry("id", Node::from(args.id.to_string()))?
                .entry("size", Node::Int(i64::try_from(bytes.len())?))?
                .entry("hex", Node::from(hex::encode(&bytes)))?
                .build();
            println!("{}", String::from_utf8(dagjson::encode(&node)?)?);
        }
    }
    Ok(())
}

fn cmd_floats(ipts: &Ipts, args: FloatsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let node = ipts.fetch(&args.id)?;
    let path: Vec<&str> = args.path.split('/').filter(|s| !s.is_empty()).collect();
    let strict = ipts.config().strict_floats && !args.truncate;
    let floats = ipts_sdk::float_vector_at(&node, &path, strict)?;
    print_floats(&floats, format)
}

fn print_floats(floats: &[f32], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for v in floats {
                println!("{v}");
            }
        }
        OutputFormat::Json => {
            let list = floats
                .iter()
                .fold(ListBuilder::with_capacity(floats.len()), |b, v| {
                    b.push(Node::Float(f64::from(*v)))
                })
                .build();
            println!("{}", String::from_utf8(dagjson::encode(&list)?)?);
        }
    }
    Ok(())
}

fn cmd_pipeline(ipts: &Ipts, args: PipelineArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let strict = ipts.config().strict_floats && !args.truncate;
    let report = ipts_sdk::run_pipeline(ipts.store(), &args.file, strict)?;
    if *format == OutputFormat::Text {
        println!("{} stored {}", "✓".green().bold(), report.id.to_string().yellow());
        println!("  Root: {} with {} entries", report.kind.to_string().cyan(), report.len);
        println!("  Floats: {}", report.floats.len().to_string().bold());
    }
    print_floats(&report.floats, format)
}

fn cmd_head_record(ipts: &Ipts, args: HeadRecordArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let record = read_input(args.record.as_deref())?;
    let head = ipts.head_record(&args.schema, &record)?;
    let node = head.to_node()?;
    print_node(&node, format)?;
    if args.put {
        let id = ipts.store().put_node(&node, Codec::DagCbor)?;
        print_id("stored head record", &id, format)?;
    }
    Ok(())
}

fn cmd_create(ipts: &Ipts, args: CreateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let schema = dagjson::decode_slice(&read_input(args.schema.as_deref())?)?;
    let root = ipts.table().create(&schema)?;
    print_id("created table", &root, format)
}

fn cmd_insert(ipts: &Ipts, args: InsertArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let record = read_input(args.record.as_deref())?;
    let root = ipts.insert_json(&args.root, &record)?;
    print_id("inserted; new root", &root, format)
}

fn cmd_select(ipts: &Ipts, args: SelectArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    let selection = ipts.select(&args.root, &fields, args.limit)?;
    match format {
        OutputFormat::Text => print!("{}", render_table(&selection)),
        OutputFormat::Json => {
            println!("{}", String::from_utf8(dagjson::encode(&selection_node(&selection)?)?)?)
        }
    }
    Ok(())
}

/// Rows as a list of maps keyed by column name.
fn selection_node(selection: &Selection) -> anyhow::Result<Node> {
    let mut rows = ListBuilder::with_capacity(selection.rows.len());
    for row in &selection.rows {
        let mut map = MapBuilder::with_capacity(row.len());
        for (name, cell) in selection.columns.iter().zip(row) {
            map.insert(name.clone(), cell.to_node())?;
        }
        rows.append(map.build());
    }
    Ok(rows.build())
}

/// Pipe-separated text table with a title separator.
fn render_table(selection: &Selection) -> String {
    let titles: Vec<String> = selection
        .columns
        .iter()
        .map(|c| {
            if c == TIMESTAMP_FIELD {
                "timestamp (UTC)".to_string()
            } else {
                c.clone()
            }
        })
        .collect();
    let cells: Vec<Vec<String>> = selection
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            cells
                .iter()
                .filter_map(|r| r.get(i))
                .map(String::len)
                .chain(std::iter::once(t.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!(" {v:<w$} "))
            .collect();
        format!("|{}|\n", padded.join("|"))
    };
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();

    let mut out = line(&titles);
    out.push_str(&format!("|{}|\n", rule.join("|")));
    for row in &cells {
        out.push_str(&line(row));
    }
    out
}

/// 16 bytes per line: offset, hex pairs.
fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let pairs: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            format!("{:08x}  {}\n", i * 16, pairs.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipts_table::Cell;

    fn selection() -> Selection {
        Selection {
            columns: vec!["temp".into(), TIMESTAMP_FIELD.into()],
            rows: vec![
                vec![Cell::F32(21.5), Cell::Timestamp(0)],
                vec![Cell::F32(-3.0), Cell::Timestamp(60)],
            ],
        }
    }

    #[test]
    fn table_rendering() {
        let text = render_table(&selection());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| temp | timestamp (UTC)     |");
        assert_eq!(lines[1], "|------|---------------------|");
        assert_eq!(lines[2], "| 21.5 | 1970-01-01 00:00:00 |");
        assert_eq!(lines[3], "| -3   | 1970-01-01 00:01:00 |");
    }

    #[test]
    fn empty_table_has_titles_only() {
        let text = render_table(&Selection {
            columns: vec!["rh".into()],
            rows: vec![],
        });
        assert_eq!(text, "| rh |\n|----|\n");
    }

    #[test]
    fn selection_as_nodes() {
        let node = selection_node(&selection()).unwrap();
        assert_eq!(node.len(), 2);
        let first = node.lookup_by_index(0).unwrap();
        assert_eq!(first.lookup_by_key("temp").unwrap(), &Node::Float(21.5));
        assert_eq!(first.lookup_by_key(TIMESTAMP_FIELD).unwrap(), &Node::Int(0));
    }

    #[test]
    fn hex_dump_lines() {
        let bytes: Vec<u8> = (0u8..20).collect();
        let dump = hex_dump(&bytes);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000  00 01 02"));
        assert_eq!(lines[1], "00000010  10 11 12 13");
        assert!(hex_dump(&[]).is_empty());
    }

    #[test]
    fn read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, br#"{"temp": 1}"#).unwrap();
        assert_eq!(read_input(Some(path.as_path())).unwrap(), br#"{"temp": 1}"#);
        assert!(read_input(Some(dir.path().join("missing.json").as_path())).is_err());
    }
}
