use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use book_narrator::book::{self, AudioRequest, BookProcessor};
use book_narrator::compare::{self, VoiceComparisonResult};
use book_narrator::engine;
use book_narrator::report::ProgressReporter;
use book_narrator::{samples, Config, NarratorError};

fn cli() -> Command {
    Command::new("book-narrator")
        .version(env!("CARGO_PKG_VERSION"))
        .about("📚 Convert EPUBs to structured chapters and narrate them with local TTS")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON settings file")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("books-dir")
                .long("books-dir")
                .value_name("DIR")
                .help("Directory holding book projects")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Show per-segment diagnostics")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("📖 Convert an EPUB to structured Markdown")
                .arg(Arg::new("epub").value_name("EPUB").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(Arg::new("title").value_name("TITLE").help("Book title for organization").required(true))
                .arg(Arg::new("slug").long("slug").value_name("SLUG").help("Custom book directory name")),
        )
        .subcommand(
            Command::new("list-chapters")
                .about("📋 List all chapters in a book")
                .arg(Arg::new("book").value_name("BOOK_DIR").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(Arg::new("no-audio").long("no-audio").help("Hide audio status").action(ArgAction::SetTrue))
                .arg(engine_arg()),
        )
        .subcommand(
            Command::new("generate-audio")
                .about("🎵 Generate TTS audio for specific chapters")
                .arg(Arg::new("book").value_name("BOOK_DIR").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(
                    Arg::new("chapters")
                        .value_name("CHAPTER")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(Arg::new("voice").long("voice").value_name("VOICE").help("Voice to use"))
                .arg(engine_arg())
                .arg(
                    Arg::new("no-combine")
                        .long("no-combine")
                        .help("Keep one file per segment instead of one per chapter")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("🎭 Compare different voices with your sample text")
                .arg(Arg::new("text").value_name("TEXT_FILE").required(true).value_parser(clap::value_parser!(PathBuf)))
                .arg(
                    Arg::new("voice")
                        .short('v')
                        .long("voice")
                        .value_name("VOICE")
                        .help("Specific voices to test (repeat for multiple)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(Arg::new("all").long("all").help("Test all available voices").action(ArgAction::SetTrue))
                .arg(engine_arg()),
        )
        .subcommand(Command::new("create-sample").about("📝 Create sample text files for voice testing"))
        .subcommand(Command::new("list-voices").about("🎭 List all available voices"))
}

fn engine_arg() -> Arg {
    Arg::new("engine")
        .long("engine")
        .value_name("ENGINE")
        .help("TTS engine to narrate with")
        .value_parser([engine::espeak::ENGINE_NAME])
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            if let Some(NarratorError::Validation { what: "voices", .. }) = e.downcast_ref::<NarratorError>() {
                eprintln!("Available voices: {}", engine::VOICE_NAMES.join(", "));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(books_dir) = matches.get_one::<PathBuf>("books-dir") {
        config.books_dir = books_dir.clone();
    }

    match matches.subcommand() {
        Some(("convert", args)) => convert(&config, args),
        Some(("list-chapters", args)) => list_chapters(&config, args),
        Some(("generate-audio", args)) => generate_audio(&config, args),
        Some(("compare", args)) => compare_voices(&config, args),
        Some(("create-sample", _)) => create_sample(&config),
        Some(("list-voices", _)) => list_voices(&config),
        _ => unreachable!("subcommand is required"),
    }
}

fn selected_engine<'m>(config: &'m Config, args: &'m ArgMatches) -> &'m str {
    args.get_one::<String>("engine")
        .map(String::as_str)
        .unwrap_or(&config.engine)
}

fn convert(config: &Config, args: &ArgMatches) -> Result<()> {
    let epub_path = args.get_one::<PathBuf>("epub").expect("required");
    let title = args.get_one::<String>("title").expect("required");
    let slug = args.get_one::<String>("slug").map(String::as_str);

    println!("📚 Converting: {}", title);
    let processor = BookProcessor::new(&config.books_dir);
    let conversion = processor.convert(epub_path, title, slug, &config.engine)?;

    println!("📁 Book slug: {}", conversion.metadata.slug);
    if let Some(copied) = &conversion.copied_source {
        println!("📄 Copied EPUB to: {}", copied.display());
    }
    println!("✅ Converted {} chapters", conversion.toc.chapters.len());
    println!("📂 Book saved to: {}", conversion.layout.root.display());
    println!("📊 Total words: {}", conversion.toc.total_words());
    println!();

    println!("{:>7}  {:<50}  {:>7}", "Chapter", "Title", "Words");
    for entry in conversion.toc.chapters.iter().take(10) {
        println!("{:>7}  {:<50}  {:>7}", entry.number, truncate(&entry.title, 50), entry.word_count);
    }
    if conversion.toc.chapters.len() > 10 {
        println!("{:>7}  ... and {} more chapters", "...", conversion.toc.chapters.len() - 10);
    }

    Ok(())
}

fn list_chapters(config: &Config, args: &ArgMatches) -> Result<()> {
    let book_path = args.get_one::<PathBuf>("book").expect("required");
    let show_audio = !args.get_flag("no-audio");

    let (metadata, listings) = book::list_chapters(book_path, show_audio, selected_engine(config, args))?;

    println!("📚 {} by {}", metadata.title, metadata.author);
    println!();
    for listing in &listings {
        let status = match listing.has_audio {
            Some(true) => "🎵",
            Some(false) => "⚪",
            None => "",
        };
        println!(
            "{:>4}  {:<60}  {:>7}  {}",
            listing.entry.number,
            truncate(&listing.entry.title, 60),
            listing.entry.word_count,
            status
        );
    }

    if show_audio {
        println!();
        println!("🎵 = Audio available, ⚪ = No audio yet");
    }
    Ok(())
}

fn generate_audio(config: &Config, args: &ArgMatches) -> Result<()> {
    let book_path = args.get_one::<PathBuf>("book").expect("required");
    let chapters: Vec<usize> = args
        .get_many::<usize>("chapters")
        .map(|values| values.copied().collect())
        .unwrap_or_default();
    let voice = args.get_one::<String>("voice").unwrap_or(&config.voice);
    let combine_segments = config.combine_segments && !args.get_flag("no-combine");

    let engine_name = selected_engine(config, args);
    let request = AudioRequest {
        chapters: &chapters,
        voice,
        combine_segments,
    };

    book::check_audio_request(book_path, &request, engine::voices_for(engine_name)?)?;
    let mut engine = engine::open(engine_name, &config.lang_code, config.chunk_chars)?;
    let reporter = ProgressReporter::new();
    let outcomes = book::generate_audio(book_path, &request, engine.as_mut(), &reporter)?;
    for outcome in &outcomes {
        match (&outcome.error, outcome.files.first()) {
            (None, Some(first)) => println!("✅ Generated: {}", first.display()),
            (Some(e), _) => println!("❌ Failed to generate audio for chapter {}: {}", outcome.number, e),
            (None, None) => println!("❌ Failed to generate audio for chapter {}", outcome.number),
        }
    }
    Ok(())
}

fn compare_voices(config: &Config, args: &ArgMatches) -> Result<()> {
    let text_file = args.get_one::<PathBuf>("text").expect("required");
    let output_dir = args
        .get_one::<PathBuf>("output-dir")
        .unwrap_or(&config.comparisons_dir);

    let engine_name = selected_engine(config, args);
    let known_voices = engine::voices_for(engine_name)?;

    let requested: Vec<String> = args
        .get_many::<String>("voice")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let voices: Vec<String> = if args.get_flag("all") || requested.is_empty() {
        known_voices.iter().map(|voice| voice.to_string()).collect()
    } else {
        requested
    };

    println!("📝 Voice Playground");
    println!("📄 Text file: {}", text_file.display());
    println!("🎭 Testing voices: {}", voices.join(", "));
    println!();

    compare::prepare_comparison(text_file, &voices, known_voices)?;
    let mut engine = engine::open(engine_name, &config.lang_code, config.chunk_chars)?;
    let reporter = ProgressReporter::new();
    let started = Instant::now();
    let run = compare::compare_file(text_file, &voices, output_dir, engine.as_mut(), &reporter)?;

    println!();
    println!("🎭 Voice Comparison Results ({} characters, {:.1?})", run.text_chars, started.elapsed());
    println!("{:<12}  {:<40}  {:>8}  {:>9}  {:>8}  Status", "Voice", "Audio File", "Size", "Duration", "Gen Time");
    for result in &run.results {
        print_result(result);
    }

    let successful: Vec<_> = run.results.iter().filter(|r| r.success).collect();
    if !successful.is_empty() {
        println!();
        println!("📁 Generated Files:");
        for result in successful {
            println!("   🎵 {}", run.session_dir.join(&result.file).display());
        }
        println!();
        println!("💡 Listen to the files in {} and pick a voice, then run:", run.session_dir.display());
        println!("   book-narrator generate-audio books/<book> <chapters> --voice <VOICE>");
    }
    Ok(())
}

fn print_result(result: &VoiceComparisonResult) {
    let (size, duration) = if result.success {
        (format!("{:.1}MB", result.size_mb()), format!("{:.1}min", result.duration_mins()))
    } else {
        ("-".to_string(), "-".to_string())
    };
    let gen_time = if result.generation_secs > 0.0 {
        format!("{:.1}s", result.generation_secs)
    } else {
        "-".to_string()
    };
    println!(
        "{:<12}  {:<40}  {:>8}  {:>9}  {:>8}  {}",
        result.voice,
        result.file,
        size,
        duration,
        gen_time,
        if result.success { "✅" } else { "❌" }
    );
}

fn create_sample(config: &Config) -> Result<()> {
    println!("📝 Creating Sample Text Files");
    let written = samples::create_samples(&config.samples_dir)?;
    for sample in &written {
        println!("✅ Created: {} ({} chars)", sample.path.display(), sample.chars);
    }

    let dir = config.samples_dir.display();
    println!();
    println!("💡 Usage Examples:");
    println!("   book-narrator compare {}/short_sample.txt --all", dir);
    println!("   book-narrator compare {}/medium_sample.txt -v af_bella -v af_sarah", dir);
    println!("   book-narrator compare {}/long_sample.txt -v af_heart", dir);
    Ok(())
}

fn list_voices(config: &Config) -> Result<()> {
    println!("🎭 Available Voices ({})", config.engine);
    println!();
    for name in engine::voices_for(&config.engine)? {
        println!("{:<12}  {}", name, engine::voice_description(name).unwrap_or(""));
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
