use std::fmt::Display;

use console::Style;
use echelle_core::classify::Classification;
use echelle_core::frame::{FrameClass, SuperFrame};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            warn: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn title_line(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!(
        "  {}",
        s.title.apply_to("\u{2550}".repeat(title.chars().count()))
    );
    println!();
}

pub fn print_classification(classification: &Classification, list_files: bool) {
    let s = Styles::new();

    title_line(&s, "Classification");
    println!(
        "  {:<14}{}",
        s.label.apply_to("Root"),
        s.path.apply_to(classification.data_root().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Total"),
        s.value.apply_to(classification.total())
    );
    println!();

    for class in FrameClass::ALL {
        println!(
            "  {:<14}{}",
            s.label.apply_to(class),
            s.value.apply_to(classification.count(class))
        );
        if list_files {
            for path in classification.class_list(class) {
                println!("    {}", path.display());
            }
        }
    }

    if !classification.skipped().is_empty() {
        println!();
        println!(
            "  {}",
            s.warn
                .apply_to(format!("Skipped {} file(s)", classification.skipped().len()))
        );
        for skipped in classification.skipped() {
            println!("    {} ({})", skipped.path.display(), skipped.reason);
        }
    }
    println!();
}

pub fn print_super_frame(frame: &SuperFrame) {
    let s = Styles::new();
    let provenance = |flag: Option<bool>| match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    };
    println!(
        "  {:<18}{}  {}",
        s.label.apply_to(&frame.name),
        s.value
            .apply_to(format!("{}x{}", frame.width(), frame.height())),
        s.label.apply_to(format!(
            "combine={} biasSub={} darkSub={}",
            frame.combine_method(),
            provenance(frame.bias_subtracted()),
            provenance(frame.dark_subtracted())
        ))
    );
}

pub fn print_section(title: &str) {
    let s = Styles::new();
    println!();
    println!("  {}", s.header.apply_to(title));
}

pub fn print_result(label: &str, value: impl Display) {
    let s = Styles::new();
    println!(
        "    {:<12}{}",
        s.label.apply_to(label),
        s.value.apply_to(value)
    );
}
