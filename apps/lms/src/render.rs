//! Plain-text rendering of page state to stdout.

use client_core::{
    pages::{DashboardPage, SchedulePage},
    AssetResolver,
};
use shared::protocol::{Content, Module, Schedule, User};

const WEEKDAYS: &str = "Su  Mo  Tu  We  Th  Fr  Sa";

pub fn profile(user: &User, assets: &AssetResolver) {
    println!("{} <{}>", user.name, user.email);
    println!("role:   {}", user.role);
    println!("avatar: {}", assets.avatar(&user.name, user.avatar.as_deref()));
}

pub fn dashboard(page: &DashboardPage, assets: &AssetResolver) {
    if let Some(featured) = page.featured_module() {
        println!("== {} ==", featured.title);
        if let Some(description) = featured.description.as_deref() {
            println!("{description}");
        }
        println!();
    }

    println!("Modules");
    for card in page.module_cards() {
        let pemateri = card.pemateri.unwrap_or("-");
        println!("  {} ({pemateri})", card.module);
        if let Some(thumbnail) = assets.thumbnail(card.thumbnail) {
            println!("    {thumbnail}");
        }
        for title in card.content_titles {
            println!("    - {title}");
        }
    }

    println!("\nLeaderboard");
    for entry in page.leaderboard() {
        println!("  {:>2}. {:<24} {:>6} pts", entry.rank, entry.user.name, entry.total_point);
    }

    println!("\nSchedules");
    for schedule in page.schedules() {
        println!("  {}", schedule_line(schedule));
    }
}

pub fn module_list(modules: &[Module], assets: &AssetResolver) {
    if modules.is_empty() {
        println!("No modules found.");
        return;
    }
    for module in modules {
        let status = if module.is_active { "active" } else { "inactive" };
        let pemateri = module.pemateri.as_ref().map_or("-", |p| p.name.as_str());
        println!(
            "{:>5}  {:<40} {:<8} {:<20} {} contents, {} enrolled",
            module.id.0, module.title, status, pemateri, module.contents_count, module.enrollments_count
        );
        if let Some(thumbnail) = assets.thumbnail(module.thumbnail.as_deref()) {
            println!("       {thumbnail}");
        }
    }
}

pub fn module_detail(module: Option<&Module>, contents: &[Content], assets: &AssetResolver) {
    if let Some(module) = module {
        println!("{} (#{})", module.title, module.id);
        if let Some(description) = module.description.as_deref() {
            println!("{description}");
        }
        if let Some(thumbnail) = assets.thumbnail(module.thumbnail.as_deref()) {
            println!("thumbnail: {thumbnail}");
        }
        println!();
    }
    if contents.is_empty() {
        println!("No contents yet.");
    }
    for (index, content) in contents.iter().enumerate() {
        let published = if content.is_published { "" } else { " [draft]" };
        println!(
            "{:>3}. {:<40} {:<6} #{}{published}",
            index + 1,
            content.title,
            content.content_type.as_str(),
            content.id
        );
    }
}

pub fn content(content: &Content, assets: &AssetResolver) {
    println!("{} ({})", content.title, content.content_type);
    if let Some(module) = &content.module {
        println!("module: {}", module.title);
    }
    if let Some(author) = &content.author {
        println!("author: {}", author.name);
    }
    if let Some(thumbnail) = assets.thumbnail(content.thumbnail.as_deref()) {
        println!("thumbnail: {thumbnail}");
    }
    println!("\n{}", content.body);
}

pub fn users(users: &[User], assets: &AssetResolver) {
    if users.is_empty() {
        println!("No accounts found.");
        return;
    }
    for user in users {
        println!("{:>5}  {:<28} {:<32} {}", user.id.0, user.name, user.email, user.role);
        println!("       {}", assets.avatar(&user.name, user.avatar.as_deref()));
    }
}

pub fn calendar(page: &SchedulePage) {
    println!("{:^26}", page.month().format("%B %Y").to_string());
    println!("{WEEKDAYS}");

    let mut line = "    ".repeat(page.leading_blanks() as usize);
    let mut column = page.leading_blanks();
    for day in page.grid() {
        let marker = if day.has_schedule { '*' } else { ' ' };
        let cell = if day.is_selected {
            format!("[{:>2}]", day.day)
        } else if day.is_today {
            format!("({:>2})", day.day)
        } else {
            format!(" {:>2}{marker}", day.day)
        };
        line.push_str(&cell);
        column += 1;
        if column % 7 == 0 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }

    let Some(day) = page.selected_day() else {
        return;
    };
    println!();
    let schedules = page.selected_schedules();
    if schedules.is_empty() {
        println!("Nothing scheduled on day {day}.");
    }
    for schedule in schedules {
        println!("{}", schedule_line(schedule));
    }
}

fn schedule_line(schedule: &Schedule) -> String {
    let when = match (schedule.starts_at(), schedule.ends_at()) {
        (Some(start), Some(end)) => format!(
            "{} {}-{}",
            start.format("%Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M")
        ),
        (Some(start), None) => start.format("%Y-%m-%d %H:%M").to_string(),
        _ => schedule.start_time.clone(),
    };
    let location = schedule.location.as_deref().unwrap_or("-");
    format!("{when}  {}  @ {location}", schedule.title)
}
