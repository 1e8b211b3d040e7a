//! Chapters of the course a quiz can be generated for.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
}

pub const CHAPTERS: [Chapter; 9] = [
    Chapter {
        id: 1,
        title: "مقدمه‌ای بر روانشناسی شناختی",
        description: "مبانی و تاریخچه روانشناسی شناختی.",
    },
    Chapter {
        id: 2,
        title: "ادراک",
        description: "چگونگی تفسیر اطلاعات حسی توسط مغز.",
    },
    Chapter {
        id: 3,
        title: "توجه و آگاهی",
        description: "فرآیندهای انتخاب و تمرکز بر محرک‌ها.",
    },
    Chapter {
        id: 4,
        title: "حافظه: مدل‌ها و روش‌ها",
        description: "ساختارها و انواع مختلف سیستم حافظه.",
    },
    Chapter {
        id: 5,
        title: "فرآیندهای حافظه",
        description: "رمزگذاری، ذخیره‌سازی و بازیابی اطلاعات.",
    },
    Chapter {
        id: 6,
        title: "بازنمایی دانش",
        description: "نحوه سازماندهی اطلاعات در ذهن.",
    },
    Chapter {
        id: 7,
        title: "زبان",
        description: "درک، تولید و اکتساب زبان.",
    },
    Chapter {
        id: 8,
        title: "حل مسئله و خلاقیت",
        description: "استراتژی‌های شناختی برای حل مشکلات.",
    },
    Chapter {
        id: 9,
        title: "تصمیم‌گیری و استدلال",
        description: "فرآیندهای قضاوت و انتخاب منطقی.",
    },
];

pub fn chapter_by_id(id: u32) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.id == id)
}

pub fn chapter_by_title(title: &str) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.title == title)
}
