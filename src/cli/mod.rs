use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "provy")]
#[command(version, about = "A declarative model-group provisioner", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Download every enabled model group into the workspace
	Provision {
		/// Also install custom nodes before fetching models
		#[arg(long)]
		with_nodes: bool,
	},

	/// Show what a run would fetch, without downloading anything
	Plan {
		/// Emit the plan as JSON
		#[arg(long)]
		json: bool,
	},

	/// List catalog groups and whether they resolve as enabled
	List,

	/// Install custom nodes only
	Nodes,
}
