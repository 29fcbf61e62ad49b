use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aws_config::Region;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sitestack::config::ZoneSource;
use sitestack::deploy_script::{deploy_script, CERTIFICATE_TEMPLATE_FILE, DEPLOY_FILE, SITE_TEMPLATE_FILE};
use sitestack::regions::CERTIFICATE_REGION;
use sitestack::{synthesize, DeployTarget, Route53Zones, SiteSettings, SiteTopology, Synthesized, ZoneLookup};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

/// Builds the CloudFormation templates of a static website
#[derive(Parser, Debug)]
#[command(name = "sitestack", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the templates and a deploy script to an output directory
    Synth {
        #[command(flatten)]
        site: SiteArgs,
        /// Directory the templates and deploy.sh are written to
        #[arg(long, env = "SITESTACK_OUT_DIR", default_value = "sitestack.out")]
        out_dir: PathBuf,
    },
    /// Print the resources, dependencies and exports of a site
    Show {
        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Path to a site settings toml file
    #[arg(long, short, env = "SITESTACK_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "SITESTACK_SITE_NAME")]
    site_name: Option<String>,
    #[arg(long, env = "SITESTACK_DOMAIN_NAME")]
    domain_name: Option<String>,
    #[arg(long, env = "SITESTACK_SITE_SUB_DOMAIN")]
    site_sub_domain: Option<String>,
    /// Region of the site stack. The certificate stack is always in us-east-1
    #[arg(long, env = "SITESTACK_REGION")]
    region: Option<String>,
    #[arg(long, env = "SITESTACK_STACK_NAME")]
    stack_name: Option<String>,
    #[arg(long, value_enum, env = "SITESTACK_ZONE_SOURCE")]
    zone_source: Option<ZoneSourceArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ZoneSourceArg {
    Route53,
    Static,
}

impl From<ZoneSourceArg> for ZoneSource {
    fn from(value: ZoneSourceArg) -> Self {
        match value {
            ZoneSourceArg::Route53 => ZoneSource::Route53,
            ZoneSourceArg::Static => ZoneSource::Static,
        }
    }
}

impl SiteArgs {
    fn load_settings(&self) -> Result<SiteSettings> {
        let mut settings = match (&self.config, &self.site_name) {
            (Some(path), _) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read site settings {:?}", path))?;
                SiteSettings::from_toml_str(&data)
                    .with_context(|| format!("Invalid site settings in {:?}", path))?
            }
            (None, Some(name)) => SiteSettings::new(name.clone()),
            (None, None) => bail!("Either --config or --site-name is required"),
        };
        if let Some(name) = &self.site_name {
            settings.site_name = name.clone();
        }
        if let Some(domain) = &self.domain_name {
            settings.domain_name = Some(domain.clone());
        }
        if let Some(sub) = &self.site_sub_domain {
            settings.site_sub_domain = sub.clone();
        }
        if let Some(region) = &self.region {
            settings.deploy.region = region.clone();
        }
        if let Some(stack_name) = &self.stack_name {
            settings.deploy.stack_name = Some(stack_name.clone());
        }
        if let Some(source) = self.zone_source {
            settings.zones.source = source.into();
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn zone_lookup(settings: &SiteSettings, runtime: &Handle) -> Box<dyn ZoneLookup> {
    match settings.zones.source {
        ZoneSource::Route53 => {
            // route53 is global, its api lives in us-east-1
            let sdk_config = runtime.block_on(
                aws_config::from_env().region(Region::new(CERTIFICATE_REGION)).load()
            );
            Box::new(Route53Zones::new(&sdk_config, runtime.clone()))
        }
        ZoneSource::Static => Box::new(settings.static_zones()),
    }
}

fn build(settings: &SiteSettings, runtime: &Handle) -> Result<(SiteTopology, DeployTarget)> {
    let target = DeployTarget::new(settings.stack_name(), &settings.deploy.region)?;
    let zones = zone_lookup(settings, runtime);
    let topology = SiteTopology::build(&settings.site_configuration(), &target.stack_name, zones.as_ref())
        .with_context(|| format!("Failed to build site {}", settings.site_name))?;
    Ok((topology, target))
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    std::fs::write(path, data).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn write_outputs(out_dir: &Path, synth: &Synthesized) -> Result<()> {
    // render everything first so a failure leaves nothing half written
    let site = synth.site.to_json()?;
    let certificate = synth.certificate.as_ref().map(|c| c.to_json()).transpose()?;
    let script = deploy_script(synth);

    std::fs::create_dir_all(out_dir).with_context(|| format!("Failed to create output directory {:?}", out_dir))?;
    write_file(&out_dir.join(SITE_TEMPLATE_FILE), &site)?;
    if let Some(certificate) = certificate {
        write_file(&out_dir.join(CERTIFICATE_TEMPLATE_FILE), &certificate)?;
    }
    let script_path = out_dir.join(DEPLOY_FILE);
    write_file(&script_path, &script)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {:?} executable", script_path))?;
    }
    Ok(())
}

fn synth(site: &SiteArgs, out_dir: &Path, runtime: &Handle) -> Result<()> {
    let settings = site.load_settings()?;
    let (topology, target) = build(&settings, runtime)?;
    let synth = synthesize(&topology, &target);
    write_outputs(out_dir, &synth)?;
    tracing::info!(out_dir = %out_dir.display(), "wrote templates");

    let exports: serde_json::Map<String, serde_json::Value> = topology.exports().iter()
        .map(|(name, value)| (name.to_string(), value.to_value()))
        .collect();
    println!("{}", serde_json::to_string_pretty(&exports)?);
    Ok(())
}

fn show(site: &SiteArgs, runtime: &Handle) -> Result<()> {
    let settings = site.load_settings()?;
    let (topology, target) = build(&settings, runtime)?;
    println!("site {} (stack {}, region {})", topology.site_name(), target.stack_name, target.region);
    match topology.domain() {
        Some(ctx) => println!("domain {} (hosted zone {})", ctx.resolved_domain(), ctx.zone().id),
        None => println!("domain none"),
    }
    println!("resources:");
    for (id, deps) in topology.dependencies() {
        let deps: Vec<&str> = deps.iter().map(|d| d.as_str()).collect();
        if deps.is_empty() {
            println!("  {id}");
        } else {
            println!("  {id} <- {}", deps.join(", "));
        }
    }
    println!("exports:");
    for (name, value) in topology.exports().iter() {
        println!("  {name} = {}", value.to_value());
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    match &cli.command {
        Command::Synth { site, out_dir } => synth(site, out_dir, runtime.handle()),
        Command::Show { site } => show(site, runtime.handle()),
    }
}
