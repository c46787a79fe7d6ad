use clap::{App, Arg, ArgMatches};
use fnv::FnvHashSet;
use std::fs::File;
use std::process;

use latticework::archive::{ArchiveReader, ArchiveWriter, Record};
use latticework::expand::{expand, MatchChannel};
use latticework::lattice::Label;
use latticework::registry::SequenceRegistry;
use latticework::symbols::table_from_registry;

fn main() {
    let matches = App::new("lattice-char-to-word")
        .version("0.1")
        .about(
            "Rewrites character-level lattices into word-level lattices by \
             collapsing the subpaths between any two separator symbols into \
             single word arcs. The expansion cost is exponential in the \
             branching between separators; prune the input with --beam and \
             bound the word length with --max-length to keep it practical.",
        )
        .arg(
            Arg::with_name("separator-symbols")
                .help("whitespace-separated list of separator labels, e.g. \"3 4\"")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::with_name("lattice-in")
                .help("archive to read character lattices from")
                .index(2)
                .required(true),
        )
        .arg(
            Arg::with_name("lattice-out")
                .help("archive to write word lattices to")
                .index(3)
                .required(true),
        )
        .arg(
            Arg::with_name("acoustic-scale")
                .long("acoustic-scale")
                .takes_value(true)
                .default_value("1.0")
                .help("scaling factor for acoustic likelihoods in the lattices"),
        )
        .arg(
            Arg::with_name("graph-scale")
                .long("graph-scale")
                .takes_value(true)
                .default_value("1.0")
                .help("scaling factor for graph probabilities in the lattices"),
        )
        .arg(
            Arg::with_name("beam")
                .long("beam")
                .takes_value(true)
                .help("pruning beam applied to the scaled input lattices (default: no pruning)"),
        )
        .arg(
            Arg::with_name("max-length")
                .long("max-length")
                .takes_value(true)
                .help("maximum length (in characters) for a word"),
        )
        .arg(
            Arg::with_name("save-symbols")
                .long("save-symbols")
                .takes_value(true)
                .help(
                    "write one symbol table shared by all lattices to this file \
                     instead of embedding a fresh table in every record",
                ),
        )
        .get_matches();

    if let Err(message) = run(&matches) {
        eprintln!("lattice-char-to-word: {}", message);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let delimiters = parse_delimiters(matches.value_of("separator-symbols").unwrap())?;
    let acoustic_scale = parse_scale(matches.value_of("acoustic-scale").unwrap(), "--acoustic-scale")?;
    let graph_scale = parse_scale(matches.value_of("graph-scale").unwrap(), "--graph-scale")?;
    let beam = match matches.value_of("beam") {
        Some(value) => value
            .parse::<f64>()
            .map_err(|_| format!("invalid --beam value '{}'", value))?,
        None => f64::INFINITY,
    };
    let max_length = match matches.value_of("max-length") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| format!("invalid --max-length value '{}'", value))?,
        None => usize::max_value(),
    };
    let save_symbols = matches.value_of("save-symbols").unwrap_or("");

    let reader = ArchiveReader::open(matches.value_of("lattice-in").unwrap())?;
    let mut writer = ArchiveWriter::create(matches.value_of("lattice-out").unwrap())?;

    let rescale = graph_scale != 1.0 || acoustic_scale != 1.0;
    let mut shared_registry = SequenceRegistry::new();
    let mut processed = 0usize;

    for entry in reader {
        let Record {
            key, mut lattice, ..
        } = entry?;

        if rescale {
            lattice.scale(graph_scale, acoustic_scale);
        }
        if beam.is_finite() {
            lattice.prune(beam);
        }
        if rescale {
            lattice.scale(1.0 / graph_scale, 1.0 / acoustic_scale);
        }

        let (lattice, symbols) = if save_symbols.is_empty() {
            let mut registry = SequenceRegistry::new();
            let expanded = expand(
                &lattice,
                &delimiters,
                MatchChannel::Output,
                max_length,
                &mut registry,
            );
            (expanded, Some(table_from_registry(&registry)))
        } else {
            let expanded = expand(
                &lattice,
                &delimiters,
                MatchChannel::Output,
                max_length,
                &mut shared_registry,
            );
            (expanded, None)
        };

        writer.write(&Record {
            key,
            lattice,
            symbols,
        })?;
        processed += 1;
    }
    writer.finish()?;

    if !save_symbols.is_empty() {
        let mut file = File::create(save_symbols)
            .map_err(|e| format!("cannot create {}: {}", save_symbols, e))?;
        table_from_registry(&shared_registry)
            .write_text(&mut file)
            .map_err(|e| format!("cannot write symbol table to {}: {}", save_symbols, e))?;
    }

    eprintln!("expanded {} lattices.", processed);
    Ok(())
}

fn parse_delimiters(symbols: &str) -> Result<FnvHashSet<Label>, String> {
    let mut delimiters = FnvHashSet::default();
    for token in symbols.split_whitespace() {
        let label: Label = token
            .parse()
            .map_err(|_| format!("invalid separator symbol '{}'", token))?;
        if label == 0 {
            return Err(String::from("epsilon (0) cannot be a separator symbol"));
        }
        delimiters.insert(label);
    }
    Ok(delimiters)
}

fn parse_scale(value: &str, option: &str) -> Result<f64, String> {
    let scale: f64 = value
        .parse()
        .map_err(|_| format!("invalid {} value '{}'", option, value))?;
    if scale <= 0.0 {
        return Err(format!("{} must be strictly greater than 0.0", option));
    }
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::{parse_delimiters, parse_scale};

    #[test]
    fn test_parse_delimiters() {
        let delimiters = parse_delimiters("3 4").unwrap();
        assert_eq!(delimiters.len(), 2);
        assert!(delimiters.contains(&3));
        assert!(delimiters.contains(&4));

        assert!(parse_delimiters("").unwrap().is_empty());
        assert!(parse_delimiters("3 x").is_err());
        assert!(parse_delimiters("3 0").is_err());
    }

    #[test]
    fn test_parse_scale() {
        assert_eq!(parse_scale("0.5", "--beam").unwrap(), 0.5);
        assert!(parse_scale("0", "--acoustic-scale").is_err());
        assert!(parse_scale("-1.0", "--graph-scale").is_err());
        assert!(parse_scale("abc", "--graph-scale").is_err());
    }
}
