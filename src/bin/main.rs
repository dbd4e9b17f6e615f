use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use gate_bench::{
    circuit::{GateId, GateKind, Position},
    graph::CombDepth,
    workspace::{Workspace, WorkspaceConfig},
};
use std::path::{Path, PathBuf};

/// Inspect and edit logic-gate circuits saved as JSON.
#[derive(Parser, Debug)]
#[command(name = "gate-bench", version)]
struct Args {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the template files.
    /// Defaults to $GATE_BENCH_TEMPLATE_DIR, then `custom_gates`.
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value every probe reads
    Eval {
        /// The circuit file
        circuit: PathBuf,
        /// Switches to turn on before evaluating
        #[arg(long, value_delimiter = ',')]
        on: Vec<String>,
    },
    /// Print the truth table over all switches and clocks
    Table {
        /// The circuit file
        circuit: PathBuf,
    },
    /// Print gate and wire counts and the deepest logic path
    Stats {
        /// The circuit file
        circuit: PathBuf,
    },
    /// List the stored templates
    Templates,
    /// Save a selection of gates as a template
    Bundle {
        /// The circuit file
        circuit: PathBuf,
        /// Template name
        name: String,
        /// Ids of the gates to bundle
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Expand a template into a circuit
    Expand {
        /// The circuit file
        circuit: PathBuf,
        /// Template name
        template: String,
        /// Left edge of the placed gates
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        /// Top edge of the placed gates
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        /// Where to write the result. Defaults to the input file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();

    let mut config = WorkspaceConfig::from_env();
    if let Some(dir) = args.template_dir {
        config = config.with_template_dir(dir);
    }
    let mut ws = Workspace::new(&config);

    match args.command {
        Command::Eval { circuit, on } => {
            load(&mut ws, &circuit)?;
            for id in &on {
                ws.netlist_mut()
                    .set_switch(&GateId::from(id.as_str()), true)
                    .with_context(|| format!("cannot turn on {id}"))?;
            }
            let netlist = ws.netlist();
            for probe in netlist.matches(|n| *n.kind() == GateKind::Probe) {
                let value = netlist.evaluate(probe.id())?;
                let name = probe.label().unwrap_or(probe.id().as_str());
                println!("{name}: {}", value as u8);
            }
        }
        Command::Table { circuit } => {
            load(&mut ws, &circuit)?;
            let table = ws.truth_table()?;
            if table.is_empty() {
                println!("Add at least one switch and one probe to build a truth table.");
            } else {
                print!("{table}");
            }
        }
        Command::Stats { circuit } => {
            load(&mut ws, &circuit)?;
            let netlist = ws.netlist();
            let depth = netlist.get_analysis::<CombDepth>()?;
            println!("Gates: {}", netlist.len());
            println!("Wires: {}", netlist.wires().len());
            println!("Logic levels: {}", depth.get_max_depth());
        }
        Command::Templates => {
            if ws.templates().is_empty() {
                println!("No templates in {}", ws.templates().dir().display());
            }
            for t in ws.templates().templates() {
                println!(
                    "{}: {} gate(s), {} input(s), {} output(s)",
                    t.name,
                    t.internal_gates.len(),
                    t.input_count(),
                    t.output_count()
                );
            }
        }
        Command::Bundle {
            circuit,
            name,
            ids,
        } => {
            load(&mut ws, &circuit)?;
            for id in &ids {
                ws.select(&GateId::from(id.as_str()))?;
            }
            let template = ws.bundle_selection(&name)?;
            println!(
                "Saved {} to {}",
                template.name,
                ws.templates().dir().display()
            );
        }
        Command::Expand {
            circuit,
            template,
            x,
            y,
            output,
        } => {
            load(&mut ws, &circuit)?;
            let placement = ws.place_template(&template, Position::new(x, y))?;
            let output = output.unwrap_or(circuit);
            ws.save(&output)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!(
                "Placed {} gate(s) and {} wire(s) into {}",
                placement.nodes.len(),
                placement.wires.len(),
                output.display()
            );
        }
    }
    Ok(())
}

fn load(ws: &mut Workspace, circuit: &Path) -> anyhow::Result<()> {
    if !circuit.exists() {
        bail!("no circuit at {}", circuit.display());
    }
    ws.load(circuit)
        .with_context(|| format!("cannot read {}", circuit.display()))
}
