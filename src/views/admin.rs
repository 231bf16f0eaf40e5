//! Back-office screens. Labels are in Thai, matching the people who use them.

use maud::{html, Markup};

use super::public::display_date;
use crate::analytics::{DaysFilter, Overview, StatusFilter, CHART_RANGES, LIST_RANGES};
use crate::db::models::{ContactSettings, HomePageData, Post, PostStatus, Quote, QuoteStatus};

fn back_to_dashboard() -> Markup {
    html! {
        p { a href="/admin/dashboard" { "← กลับไปหน้า Dashboard" } }
    }
}

fn confirm_delete(action: &str, label: &str) -> Markup {
    html! {
        form.inline method="post" action=(action) onsubmit="return confirm('ยืนยันการลบ?')" {
            button.button.danger type="submit" { (label) }
        }
    }
}

pub fn login(email: &str) -> Markup {
    html! {
        h1 { "เข้าสู่ระบบผู้ดูแล" }
        form method="post" action="/admin/login" style="max-width:24rem" {
            label for="email" { "อีเมล" }
            input #email type="email" name="email" value=(email) required autofocus;
            label for="password" { "รหัสผ่าน" }
            input #password type="password" name="password" required;
            p { button.button type="submit" { "เข้าสู่ระบบ" } }
        }
    }
}

pub fn dashboard(email: &str) -> Markup {
    let links = [
        ("/admin/blog", "จัดการบทความ", "สร้าง แก้ไข และเผยแพร่บทความ"),
        ("/admin/quotes", "ใบเสนอราคา", "ดูและติดตามคำขอจากลูกค้า"),
        ("/admin/analytics", "สถิติ", "จำนวนใบเสนอราคาในแต่ละวัน"),
        ("/admin/homepage", "หน้าแรก", "รูปภาพ Hero และ Before/After"),
        ("/admin/settings/contact", "ข้อมูลติดต่อ", "เบอร์โทร Facebook และ Line"),
    ];
    html! {
        h1 { "Dashboard" }
        p.muted { "เข้าสู่ระบบในชื่อ " (email) }
        div.grid {
            @for (href, title, description) in links {
                a.card href=(href) style="text-decoration:none" {
                    div.body {
                        h3 { (title) }
                        p.muted { (description) }
                    }
                }
            }
        }
        form method="post" action="/admin/logout" style="margin-top:2rem" {
            button.button.secondary type="submit" { "ออกจากระบบ" }
        }
    }
}

pub fn blog_list(posts: &[Post]) -> Markup {
    html! {
        (back_to_dashboard())
        h1 { "จัดการบทความ" }
        p { a.button href="/admin/blog/new" { "+ สร้างบทความใหม่" } }
        @if posts.is_empty() {
            p.muted { "ยังไม่มีบทความ" }
        } @else {
            table {
                thead { tr { th { "ชื่อบทความ" } th { "วันที่" } th { "สถานะ" } th {} } }
                tbody {
                    @for post in posts {
                        tr {
                            td {
                                (post.title)
                                br;
                                small.muted { (post.slug) }
                            }
                            td { (display_date(&post.date)) }
                            td { (post.status.as_str()) }
                            td {
                                form.inline method="post" action={ "/admin/blog/" (post.id) "/status" } {
                                    input type="hidden" name="status" value=(post.status.toggled().as_str());
                                    button.button.secondary type="submit" {
                                        @if post.is_published() { "ซ่อน" } @else { "เผยแพร่" }
                                    }
                                }
                                " "
                                a.button.secondary href={ "/admin/blog/edit/" (post.id) } { "แก้ไข" }
                                " "
                                (confirm_delete(&format!("/admin/blog/{}/delete", post.id), "ลบ"))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Create and edit share one form; `action` decides which.
pub fn post_form(heading: &str, action: &str, post: &Post, show_status: bool) -> Markup {
    html! {
        p { a href="/admin/blog" { "← กลับไปหน้าจัดการบทความ" } }
        h1 { (heading) }
        form method="post" action=(action) {
            label for="title" { "ชื่อบทความ *" }
            input #title type="text" name="title" value=(post.title) required;

            label for="slug" { "Slug" }
            input #slug type="text" name="slug" value=(post.slug);
            small.muted { "เว้นว่างไว้เพื่อสร้างจากชื่อบทความ" }

            label for="category" { "หมวดหมู่" }
            input #category type="text" name="category" value=(post.category);

            label for="description" { "คำอธิบายสั้น" }
            textarea #description name="description" rows="2" { (post.description) }

            label for="image" { "URL รูปภาพ" }
            input #image type="url" name="image" value=(post.image);

            label for="imageHint" { "คำใบ้รูปภาพ" }
            input #imageHint type="text" name="imageHint" value=(post.image_hint);

            label for="content" { "เนื้อหา (HTML) *" }
            textarea #content name="content" rows="16" required { (post.content) }

            label for="metaTitle" { "Meta title" }
            input #metaTitle type="text" name="metaTitle" value=(post.meta_title.as_deref().unwrap_or_default());

            label for="metaDescription" { "Meta description" }
            textarea #metaDescription name="metaDescription" rows="2" {
                (post.meta_description.as_deref().unwrap_or_default())
            }

            @if show_status {
                label for="status" { "สถานะ" }
                select #status name="status" {
                    @for status in [PostStatus::Draft, PostStatus::Published] {
                        option value=(status.as_str()) selected[post.status == status] { (status.as_str()) }
                    }
                }
            }

            p { button.button type="submit" { "บันทึก" } }
        }
    }
}

fn quote_status_select(quote: &Quote) -> Markup {
    html! {
        form.inline method="post" action={ "/admin/quotes/" (quote.id) "/status" } {
            select name="status" onchange="this.form.submit()" {
                @for status in QuoteStatus::ALL {
                    option value=(status.as_str()) selected[quote.status == status] { (status.label()) }
                }
            }
            noscript { button.button.secondary type="submit" { "บันทึก" } }
        }
    }
}

pub fn format_created_at(quote: &Quote) -> String {
    quote
        .created_at
        .map(|at| {
            at.with_timezone(&crate::analytics::site_offset())
                .format("%d/%m/%Y %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "ไม่มีข้อมูลวันที่".to_string())
}

pub fn quotes_list(quotes: &[Quote], status: StatusFilter, days: DaysFilter) -> Markup {
    html! {
        (back_to_dashboard())
        h1 { "รายการใบเสนอราคา" }
        form method="get" action="/admin/quotes" style="display:flex;gap:1rem;max-width:32rem" {
            select name="status" onchange="this.form.submit()" {
                option value="all" selected[status == StatusFilter::All] { "สถานะทั้งหมด" }
                @for s in QuoteStatus::ALL {
                    option value=(s.as_str()) selected[status == StatusFilter::Only(s)] { (s.label()) }
                }
            }
            select name="days" onchange="this.form.submit()" {
                option value="all" selected[days == DaysFilter::All] { "ทั้งหมด" }
                @for n in LIST_RANGES {
                    option value=(n) selected[days == DaysFilter::Last(n)] {
                        @if n == 1 { "วันนี้" } @else { (n) " วันล่าสุด" }
                    }
                }
            }
            noscript { button.button type="submit" { "กรอง" } }
        }
        @if quotes.is_empty() {
            p.muted { "ไม่พบใบเสนอราคาตามเงื่อนไข" }
        } @else {
            table {
                thead { tr { th { "วันที่" } th { "ลูกค้า" } th { "รายละเอียด" } th { "รูปภาพ" } th { "สถานะ" } th {} } }
                tbody {
                    @for quote in quotes {
                        tr {
                            td { (format_created_at(quote)) }
                            td {
                                (quote.name) br;
                                a href={ "tel:" (quote.phone) } { (quote.phone) } br;
                                small.muted { (quote.address) }
                            }
                            td { (quote.description) }
                            td {
                                @for (i, image) in quote.images.iter().enumerate() {
                                    a href=(image) target="_blank" {
                                        img src=(image) alt={ "รูปที่ " (i + 1) } style="width:4rem;height:4rem;object-fit:cover";
                                    }
                                }
                            }
                            td { (quote_status_select(quote)) }
                            td { (confirm_delete(&format!("/admin/quotes/{}/delete", quote.id), "ลบ")) }
                        }
                    }
                }
            }
        }
    }
}

pub fn analytics(overview: &Overview) -> Markup {
    let peak = overview.peak().max(1);
    html! {
        (back_to_dashboard())
        h1 { "Analytics Dashboard" }
        div.grid {
            div.card { div.body {
                p.muted { "ใบเสนอราคาทั้งหมด" }
                p style="font-size:2rem;margin:0" { (overview.total_quotes) }
            } }
            div.card { div.body {
                p.muted { "บทความทั้งหมด" }
                p style="font-size:2rem;margin:0" { (overview.total_posts) }
            } }
        }
        h2 { "สรุปใบเสนอราคา" }
        form method="get" action="/admin/analytics" {
            select name="range" onchange="this.form.submit()" style="max-width:12rem" {
                @for n in CHART_RANGES {
                    option value=(n) selected[overview.range == n] { (n) " วันล่าสุด" }
                }
            }
        }
        @if overview.has_data() {
            div.chart {
                @for day in &overview.series {
                    div.bar title={ (day.label) ": " (day.count) }
                        style={ "height:" (day.count * 100 / peak) "%" } {}
                }
            }
            div.chart-labels {
                @for day in &overview.series {
                    span { (day.label) }
                }
            }
        } @else {
            p.muted { "ไม่มีข้อมูลใบเสนอราคาในช่วงเวลานี้" }
        }
    }
}

pub fn contact_settings(contact: &ContactSettings) -> Markup {
    html! {
        (back_to_dashboard())
        h1 { "ตั้งค่าข้อมูลติดต่อ" }
        form method="post" action="/admin/settings/contact" style="max-width:32rem" {
            label for="phone" { "เบอร์โทรศัพท์ *" }
            input #phone type="tel" name="phone" value=(contact.phone) required;
            label for="facebookUrl" { "Facebook URL *" }
            input #facebookUrl type="url" name="facebookUrl" value=(contact.facebook_url) required;
            label for="lineUrl" { "Line URL *" }
            input #lineUrl type="url" name="lineUrl" value=(contact.line_url) required;
            p { button.button type="submit" { "บันทึก" } }
        }
    }
}

pub fn homepage_settings(home: &HomePageData) -> Markup {
    let fields = [
        ("heroImageUrl", "รูปภาพ Hero *", &home.hero_image_url),
        ("beforeImageUrl", "รูปภาพ Before *", &home.before_image_url),
        ("afterImageUrl", "รูปภาพ After *", &home.after_image_url),
    ];
    html! {
        (back_to_dashboard())
        h1 { "จัดการหน้าแรก" }
        form method="post" action="/admin/homepage" style="max-width:40rem" {
            @for (name, label, value) in fields {
                label for=(name) { (label) }
                input id=(name) type="url" name=(name) value=(value) required;
                @if !value.is_empty() {
                    img src=(value) alt=(label) style="max-width:12rem;margin-top:.5rem";
                }
            }
            p { button.button type="submit" { "บันทึก" } }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::DayCount;

    #[test]
    fn test_blog_list_offers_opposite_status() {
        let posts = vec![Post {
            id: "p1".to_string(),
            title: "Draft".to_string(),
            status: PostStatus::Draft,
            ..Default::default()
        }];
        let html = blog_list(&posts).into_string();
        assert!(html.contains("action=\"/admin/blog/p1/status\""));
        assert!(html.contains("name=\"status\" value=\"published\""));
    }

    #[test]
    fn test_quotes_list_marks_selected_filters() {
        let html = quotes_list(&[], StatusFilter::Only(QuoteStatus::Contacted), DaysFilter::Last(30))
            .into_string();
        assert!(html.contains("<option value=\"contacted\" selected>"));
        assert!(html.contains("<option value=\"30\" selected>"));
    }

    #[test]
    fn test_analytics_renders_one_bar_per_day() {
        let overview = Overview {
            total_quotes: 3,
            total_posts: 1,
            range: 7,
            series: (0..7)
                .map(|i| DayCount {
                    label: format!("{:02}/10", 12 + i),
                    count: if i == 6 { 2 } else { 0 },
                })
                .collect(),
        };
        let html = analytics(&overview).into_string();
        assert_eq!(html.matches("class=\"bar\"").count(), 7);
        assert!(html.contains("height:100%"));
    }
}
