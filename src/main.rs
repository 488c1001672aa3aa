//! # Sunmi Printer CLI
//!
//! Command-line interface for driving a receipt printer.
//!
//! ## Usage
//!
//! ```bash
//! # Show what the encoded bytes would be, without a printer
//! sunmi-printer --dry-run text --align center --bold "Hello"
//!
//! # Print over the network
//! sunmi-printer --addr 192.168.1.50:9100 qr "https://sunmi.com" --size 6
//!
//! # Print a three-column row on a USB printer
//! sunmi-printer --device /dev/usb/lp0 columns Latte 1 4.50 --width 20 --width 4 --width 8 --align left,center,right
//!
//! # Printer identification
//! sunmi-printer --addr 192.168.1.50 info
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `info`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sunmi_printer::{
    Alignment, BarcodeOptions, CutMode, Driver, EscPosDriver, Printer, PrinterConfig,
    PrinterError, QrErrorLevel, Symbology, TextPosition,
    protocol::{self, raw},
    render::bitmap,
    transport::{DeviceTransport, MemoryTransport, NetworkTransport, Transport},
};

/// Sunmi Printer - thermal receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "sunmi-printer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Printer device path (e.g. /dev/usb/lp0, /dev/rfcomm0)
    #[arg(long, global = true, conflicts_with = "addr")]
    device: Option<PathBuf>,

    /// Network printer address (host:port, port defaults to 9100)
    #[arg(long, global = true)]
    addr: Option<String>,

    /// Print the encoded bytes as hex tokens instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Built-in printer profile (sunmi-v2, sunmi-80mm)
    #[arg(long, global = true, default_value = "sunmi-v2")]
    profile: String,

    /// JSON printer configuration (overrides --profile)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show model, firmware version, serial number and presence
    Info,

    /// Run the firmware self-test
    SelfTest,

    /// Soft-reset the printer
    Init,

    /// Print a line of text
    Text {
        text: String,

        #[arg(long)]
        align: Option<Alignment>,

        /// Vector font size (24 = normal)
        #[arg(long)]
        size: Option<f32>,

        #[arg(long, default_value = "gh")]
        font: String,

        /// Emphasized (bold) text
        #[arg(long)]
        bold: bool,

        /// Underlined text
        #[arg(long)]
        underline: bool,
    },

    /// Print a row of up to three columns
    Columns {
        #[arg(required = true, num_args = 1..=3)]
        texts: Vec<String>,

        /// Column width in characters, once per column
        #[arg(long = "width", required = true)]
        widths: Vec<usize>,

        /// Column alignments, comma separated
        #[arg(long = "align", value_delimiter = ',')]
        aligns: Vec<Alignment>,
    },

    /// Print a 1D barcode
    Barcode {
        data: String,

        #[arg(long, default_value = "code128")]
        symbology: Symbology,

        /// Bar height in dots (1-255)
        #[arg(long, default_value = "162")]
        height: u8,

        /// Module width in dots (2-6)
        #[arg(long, default_value = "2")]
        width: u8,

        /// Human-readable text: none, above, below, both
        #[arg(long, default_value = "below")]
        text_position: TextPosition,
    },

    /// Print a QR code
    Qr {
        data: String,

        /// Module size in dots (1-16)
        #[arg(long, default_value = "6")]
        size: u8,

        /// Error correction level: L, M, Q, H
        #[arg(long, default_value = "M")]
        level: QrErrorLevel,
    },

    /// Print an image file
    Bitmap {
        file: PathBuf,

        /// Output width in dots
        #[arg(long)]
        width: u32,

        /// Output height in dots
        #[arg(long)]
        height: u32,
    },

    /// Send raw bytes given as hex tokens ("0x1B, 0x45, 0x01")
    Raw { payload: String },

    /// Feed paper
    Feed {
        #[arg(default_value = "3")]
        lines: u32,
    },

    /// Cut the paper
    Cut {
        /// Leave a hinge instead of cutting through
        #[arg(long)]
        partial: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PrinterError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PrinterConfig::from_json_file(path)?,
        None => PrinterConfig::profile(&cli.profile)?,
    };

    let dry_run_sink = MemoryTransport::new();
    let transport: Box<dyn Transport> = if cli.dry_run {
        Box::new(dry_run_sink.clone())
    } else if let Some(addr) = &cli.addr {
        Box::new(NetworkTransport::from_addr(addr)?)
    } else {
        let device = cli
            .device
            .clone()
            .unwrap_or_else(|| PathBuf::from(sunmi_printer::transport::device::DEFAULT_DEVICE));
        Box::new(DeviceTransport::open(device)?)
    };

    let printer = Printer::new(EscPosDriver::new(transport, config));
    execute(&printer, cli.command).await?;

    if cli.dry_run {
        println!("{}", raw::encode_hex_tokens(&dry_run_sink.written()));
    }
    Ok(())
}

async fn execute(
    printer: &Printer<EscPosDriver<Box<dyn Transport>>>,
    command: Commands,
) -> Result<(), PrinterError> {
    match command {
        Commands::Info => {
            println!("Present:  {}", printer.has_printer().await?);
            println!("Model:    {}", printer.model().await?);
            println!("Firmware: {}", printer.version().await?);
            println!("Serial:   {}", printer.serial_number().await?);
        }
        Commands::SelfTest => match printer.self_test().await? {
            Some(report) => println!("{}", report),
            None => println!("Printer gave no self-test report"),
        },
        Commands::Init => printer.initialize().await?,
        Commands::Text {
            text,
            align,
            size,
            font,
            bold,
            underline,
        } => {
            if let Some(align) = align {
                printer.set_alignment(align).await?;
            }
            if bold {
                printer.driver().send_raw(&protocol::text::bold_on()).await?;
            }
            if underline {
                printer.driver().send_raw(&protocol::text::underline_on()).await?;
            }
            let line = format!("{}\n", text);
            match size {
                Some(size) => printer.print_text_with_font(&line, &font, size).await?,
                None => {
                    printer.set_font_name(&font).await?;
                    printer.print_string(&line).await?;
                }
            }
            if underline {
                printer.driver().send_raw(&protocol::text::underline_off()).await?;
            }
            if bold {
                printer.driver().send_raw(&protocol::text::bold_off()).await?;
            }
        }
        Commands::Columns {
            texts,
            widths,
            aligns,
        } => {
            let mut slots = [Alignment::Left; 3];
            for (slot, align) in slots.iter_mut().zip(aligns) {
                *slot = align;
            }
            printer.print_columns_text(&texts, &widths, &slots).await?;
        }
        Commands::Barcode {
            data,
            symbology,
            height,
            width,
            text_position,
        } => {
            let options = BarcodeOptions::default()
                .height(height)
                .width(width)
                .text_position(text_position);
            printer.print_barcode(&data, symbology, options).await?;
        }
        Commands::Qr { data, size, level } => {
            printer.print_qr_code(&data, size, level).await?;
        }
        Commands::Bitmap {
            file,
            width,
            height,
        } => {
            let bytes = std::fs::read(&file)?;
            printer
                .print_bitmap(&bitmap::encode_base64(&bytes), width, height)
                .await?;
        }
        Commands::Raw { payload } => printer.send_raw_bytes(&payload).await?,
        Commands::Feed { lines } => printer.feed_lines(lines).await?,
        Commands::Cut { partial } => {
            let mode = if partial {
                CutMode::Partial
            } else {
                CutMode::Full
            };
            printer.cut_paper(mode).await?;
        }
    }
    Ok(())
}
