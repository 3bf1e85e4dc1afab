use clap::{App, Arg, ArgMatches, SubCommand};
use colored::*;
use epsboard::actuation::SUPPORTED_BURN_CHANNEL;
use epsboard::hal::mock::{BoardProbe, FailPoint, MockBoard};
use epsboard::hardware::HEATER_CHANNEL;
use epsboard::Satellite;
use std::time::Duration;

const DEFAULT_BURN_DUTY: &str = "50.0";
const DEFAULT_BURN_FREQUENCY: &str = "1000";
const DEFAULT_BURN_DURATION_MS: &str = "1000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let matches = App::new("epsboard-bringup")
        .version("0.1.0")
        .author("Space Systems Engineering Team")
        .about("🛰️  EPS board bring-up harness - runs the flight board layer against the mock")
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table"])
                .default_value("table")
                .global(true),
        )
        .arg(
            Arg::with_name("fail")
                .long("fail")
                .value_name("POINT")
                .help("Arm a mock failure before bring-up (repeatable)")
                .takes_value(true)
                .multiple(true)
                .possible_values(&[
                    "led-driver",
                    "rgb",
                    "power-monitor",
                    "solar-monitor",
                    "temperature",
                    "thermocouple",
                    "mux",
                    "can",
                    "burn-pwm",
                ])
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("report")
                .about("📊 Bring the board up and print the capability table")
                .long_about("Runs the full bring-up sequence and prints which peripherals survived it"),
        )
        .subcommand(
            SubCommand::with_name("telemetry")
                .about("🔋 Print a state-of-health frame")
                .long_about("Collects averaged voltage, current and temperature readings; absent sensors report as unavailable"),
        )
        .subcommand(
            SubCommand::with_name("scan")
                .about("🔎 Print the mux channel census taken during bring-up"),
        )
        .subcommand(
            SubCommand::with_name("nvm")
                .about("💾 Print the persistent register file"),
        )
        .subcommand(
            SubCommand::with_name("burn")
                .about("🔥 Arm and fire the burn wire against the mock")
                .arg(
                    Arg::with_name("duty")
                        .long("duty")
                        .value_name("PERCENT")
                        .help("PWM duty cycle in percent (0-100)")
                        .takes_value(true)
                        .default_value(DEFAULT_BURN_DUTY)
                        .validator(|v| match v.parse::<f32>() {
                            Ok(duty) if (0.0..=100.0).contains(&duty) => Ok(()),
                            _ => Err("Duty must be between 0 and 100 percent".into()),
                        }),
                )
                .arg(
                    Arg::with_name("frequency")
                        .long("frequency")
                        .value_name("HZ")
                        .help("PWM frequency in hertz")
                        .takes_value(true)
                        .default_value(DEFAULT_BURN_FREQUENCY)
                        .validator(|v| match v.parse::<u32>() {
                            Ok(_) => Ok(()),
                            Err(_) => Err("Frequency must be a valid number".into()),
                        }),
                )
                .arg(
                    Arg::with_name("duration-ms")
                        .long("duration-ms")
                        .value_name("MS")
                        .help("Pulse duration in milliseconds")
                        .takes_value(true)
                        .default_value(DEFAULT_BURN_DURATION_MS)
                        .validator(|v| match v.parse::<u64>() {
                            Ok(_) => Ok(()),
                            Err(_) => Err("Duration must be a valid number".into()),
                        }),
                ),
        )
        .subcommand(
            SubCommand::with_name("heater")
                .about("🌡️  Cycle the battery heater once"),
        )
        .subcommand(
            SubCommand::with_name("faces")
                .about("🌞 Sweep the face panels off and back on"),
        )
        .get_matches();

    let format = matches.value_of("format").unwrap();

    match matches.subcommand() {
        ("report", _) => {
            let (satellite, _probe) = boot(&matches)?;
            print_report(&satellite, format)?;
        }
        ("telemetry", _) => {
            let (mut satellite, _probe) = boot(&matches)?;
            print_telemetry(&mut satellite, format)?;
        }
        ("scan", _) => {
            let (satellite, _probe) = boot(&matches)?;
            print_scan(&satellite, format)?;
        }
        ("nvm", _) => {
            let (satellite, _probe) = boot(&matches)?;
            print_nvm(&satellite, format)?;
        }
        ("burn", Some(sub_matches)) => {
            let (mut satellite, probe) = boot(&matches)?;
            run_burn(&mut satellite, &probe, sub_matches)?;
        }
        ("heater", _) => {
            let (mut satellite, probe) = boot(&matches)?;
            run_heater(&mut satellite, &probe);
        }
        ("faces", _) => {
            let (mut satellite, _probe) = boot(&matches)?;
            run_faces(&mut satellite);
        }
        _ => {
            println!("{}", "No command specified. Use --help for usage information.".yellow());
            println!("{}", "Quick start:".bright_green());
            println!("  {} Capability table after bring-up", "epsboard-bringup report".bright_cyan());
            println!("  {} State-of-health frame", "epsboard-bringup telemetry".bright_cyan());
            println!("  {} Degraded boot", "epsboard-bringup report --fail power-monitor".bright_cyan());
        }
    }

    Ok(())
}

fn boot(matches: &ArgMatches<'_>) -> Result<(Satellite, BoardProbe), Box<dyn std::error::Error>> {
    let (board, probe) = MockBoard::new();
    if let Some(points) = matches.values_of("fail") {
        for name in points {
            probe.fail(fail_point(name));
        }
    }
    let satellite = Satellite::initialize(Box::new(board))?;
    Ok((satellite, probe))
}

fn fail_point(name: &str) -> FailPoint {
    match name {
        "led-driver" => FailPoint::LedDriverInit,
        "rgb" => FailPoint::RgbInit,
        "power-monitor" => FailPoint::PowerMonitorInit,
        "solar-monitor" => FailPoint::SolarMonitorInit,
        "temperature" => FailPoint::TemperatureInit,
        "thermocouple" => FailPoint::ThermocoupleInit,
        "mux" => FailPoint::MuxInit,
        "can" => FailPoint::CanInit,
        "burn-pwm" => FailPoint::BurnPwmClaim,
        _ => unreachable!("value set is closed by the argument parser"),
    }
}

fn print_report(satellite: &Satellite, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = satellite.hardware_report();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            println!("{}", "📊 Hardware Capability Table".bright_blue().bold());
            println!("{}", "════════════════════════════".bright_blue());
            for entry in &report.entries {
                let mark = if entry.available {
                    "UP  ".bright_green()
                } else {
                    "DOWN".bright_red()
                };
                println!("  {} {}", mark, entry.peripheral.label().bright_white());
            }
            println!(
                "\n{} {}/{} peripherals available",
                "✅".green(),
                report.available,
                report.total
            );
        }
    }
    Ok(())
}

fn print_telemetry(satellite: &mut Satellite, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let frame = satellite.telemetry_snapshot();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&frame)?),
        _ => {
            println!("{}", "🔋 State of Health".bright_blue().bold());
            println!("{}", "══════════════════".bright_blue());
            println!("  Battery voltage:   {}", fmt_reading(frame.battery_voltage, "V"));
            println!("  System voltage:    {}", fmt_reading(frame.system_voltage, "V"));
            println!("  Current draw:      {}", fmt_reading(frame.current_draw, "A"));
            println!("  Charge voltage:    {}", fmt_reading(frame.charge_voltage, "V"));
            println!("  Charge current:    {}", fmt_reading(frame.charge_current, "A"));
            println!("  Board temp:        {}", fmt_reading(frame.internal_temperature, "°C"));
            println!("  Battery temp:      {}", fmt_reading(frame.battery_temperature, "°C"));
            println!(
                "  Charging:          {}",
                if frame.is_charging {
                    "yes".bright_green()
                } else {
                    "no".white()
                }
            );
            println!("  Power mode:        {:?}", frame.power_mode);
            println!("  Boot count:        {}", frame.boot_count);
        }
    }
    Ok(())
}

fn print_scan(satellite: &Satellite, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = satellite.mux_scan();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => {
            println!("{}", "🔎 Mux Channel Census".bright_blue().bold());
            println!("{}", "═════════════════════".bright_blue());
            if report.channels.is_empty() {
                println!("  {}", "no census taken (mux unavailable)".yellow());
            } else {
                println!("  {}", report.describe());
            }
        }
    }
    Ok(())
}

fn print_nvm(satellite: &Satellite, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = satellite.nvm_snapshot();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        _ => {
            println!("{}", "💾 Persistent Registers".bright_blue().bold());
            println!("{}", "═══════════════════════".bright_blue());
            println!("  Boot count:           {}", snapshot.boot_count);
            println!("  VBUS resets:          {}", snapshot.vbus_reset_count);
            println!("  State errors:         {}", snapshot.state_error_count);
            println!("  Timeouts:             {}", snapshot.timeout_count);
            println!("  Charge current fault: {}", snapshot.charge_current_fault_count);
            println!("  Burn attempts:        {}", snapshot.distance_count);
            println!(
                "  Flags:                {}",
                describe_flags(&snapshot).bright_white()
            );
        }
    }
    Ok(())
}

fn describe_flags(snapshot: &epsboard::nvm::NvmSnapshot) -> String {
    let mut flags = Vec::new();
    if snapshot.soft_boot {
        flags.push("soft-boot");
    }
    if snapshot.uses_solar {
        flags.push("uses-solar");
    }
    if snapshot.burn_armed {
        flags.push("burn-armed");
    }
    if snapshot.brownout_active {
        flags.push("brownout");
    }
    if snapshot.tried_burn {
        flags.push("tried-burn");
    }
    if snapshot.shutdown_requested {
        flags.push("shutdown-requested");
    }
    if snapshot.burned {
        flags.push("burned");
    }
    if snapshot.fsk_mode {
        flags.push("fsk");
    }
    if flags.is_empty() {
        "none".to_string()
    } else {
        flags.join(", ")
    }
}

fn run_burn(
    satellite: &mut Satellite,
    probe: &BoardProbe,
    matches: &ArgMatches<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let channel = SUPPORTED_BURN_CHANNEL;
    let duty: f32 = matches.value_of("duty").unwrap().parse()?;
    let frequency: u32 = matches.value_of("frequency").unwrap().parse()?;
    let duration_ms: u64 = matches.value_of("duration-ms").unwrap().parse()?;

    satellite.arm();
    println!(
        "{} armed, firing channel {} at {:.1}% for {} ms",
        "🔥".yellow(),
        channel,
        duty,
        duration_ms
    );

    match satellite.fire(channel, duty, frequency, Duration::from_millis(duration_ms)) {
        Ok(()) => {
            println!("{} {}", "✅".green(), "burn pulse complete".bright_green());
            let relay = probe.relay();
            println!(
                "   relay de-energized: {}   pwm released: {}",
                format_bool(!relay.high),
                format_bool(!probe.burn_pwm_outstanding())
            );
        }
        Err(e) => {
            println!("{} burn failed: {}", "❌".red(), e.to_string().bright_red());
        }
    }

    satellite.disarm();
    println!("   arm state: {:?}", satellite.arm_state());
    Ok(())
}

fn run_heater(satellite: &mut Satellite, probe: &BoardProbe) {
    match satellite.heater_on() {
        Ok(()) => {
            println!(
                "{} heater on (channel {} duty {:#06x})",
                "🌡️ ".yellow(),
                HEATER_CHANNEL,
                probe.led_duty(HEATER_CHANNEL)
            );
        }
        Err(e) => {
            println!("{} heater on failed: {}", "❌".red(), e.to_string().bright_red());
            return;
        }
    }

    match satellite.heater_off() {
        Ok(()) => println!("{} heater off", "✅".green()),
        Err(e) => println!("{} heater off failed: {}", "❌".red(), e.to_string().bright_red()),
    }
}

fn run_faces(satellite: &mut Satellite) {
    satellite.all_faces_off();
    println!("{} faces de-powered", "🌑".white());

    satellite.all_faces_on();
    println!("{} faces re-powered:", "🌞".yellow());
    for status in satellite.face_statuses() {
        let state = if status.powered {
            "on".bright_green()
        } else {
            "off".bright_red()
        };
        println!(
            "   {} (channel {}) duty {:#06x} {}",
            status.face.axis().bright_white(),
            status.channel,
            status.duty,
            state
        );
    }
}

fn fmt_reading(value: Option<f32>, unit: &str) -> ColoredString {
    match value {
        Some(v) => format!("{:.2} {}", v, unit).bright_green(),
        None => "unavailable".red(),
    }
}

fn format_bool(value: bool) -> ColoredString {
    if value {
        "yes".bright_green()
    } else {
        "no".bright_red()
    }
}
