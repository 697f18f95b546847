//! Static reference data: school, teachers, class rosters and the rubric.

use crate::model::{Indicator, Question, Student, Teacher};

pub const SCHOOL_NAME: &str = "โรงเรียนสาธิตอุดมศึกษา อ.บางละมุง จ.ชลบุรี";
pub const QUESTION_COUNT: usize = 30;
pub const MAX_SCORE_PER_QUESTION: u8 = 3;
pub const MAX_TOTAL: u32 = QUESTION_COUNT as u32 * MAX_SCORE_PER_QUESTION as u32;

const TEACHERS: &[(&str, &str, &str, &str)] = &[
    ("teacherm4a", "ครูสมศรี ใจดี", "ม.4", "A"),
    ("teacherm5a", "ครูประเสริฐ มั่นคง", "ม.5", "A"),
    ("teacherm6a", "ครูวิไลวรรณ แสงทอง", "ม.6", "A"),
];

const ROSTER_M4A: &[&str] = &[
    "นายกิตติพงษ์ ศรีสุข",
    "นายธนากร วงศ์ใหญ่",
    "นางสาวกัญญารัตน์ บุญมา",
    "นางสาวจิราพร แก้วประเสริฐ",
    "นายณัฐวุฒิ พรหมมา",
    "นางสาวปิยะธิดา ทองดี",
    "นายภูมิพัฒน์ สายสุวรรณ",
    "นางสาวรัตนาภรณ์ ชัยมงคล",
    "นายวรเมธ อินทร์แก้ว",
    "นางสาวสุภาวดี มณีรัตน์",
];

const ROSTER_M5A: &[&str] = &[
    "นายชยพล รัตนวงศ์",
    "นางสาวชุติมา ศักดิ์ดี",
    "นายเตชินท์ บุญเรือง",
    "นางสาวนภัสสร สุขสวัสดิ์",
    "นายปฏิภาณ ใจมั่น",
    "นางสาวพิมพ์ชนก คำแก้ว",
    "นายศุภกร ทองคำ",
    "นางสาวอรอุมา เพ็ชรรัตน์",
    "นายอนุชา ศรีวงศ์",
];

const ROSTER_M6A: &[&str] = &[
    "นายกฤษดา สมบูรณ์",
    "นางสาวขวัญใจ พันธ์ดี",
    "นายจักรพันธ์ วงศ์สวัสดิ์",
    "นางสาวณัฐธิดา แสนสุข",
    "นายธีรเดช ปัญญาดี",
    "นางสาวเบญจวรรณ ศรีทอง",
    "นายพีรพัฒน์ จันทร์เพ็ญ",
    "นางสาวมณีรัตน์ บัวทอง",
];

const INDICATORS: &[(&str, [&str; 5])] = &[
    (
        "การตระหนักรู้และเห็นคุณค่าในตนเองและผู้อื่น",
        [
            "รู้จักจุดเด่นและจุดด้อยของตนเอง",
            "ยอมรับความแตกต่างระหว่างบุคคล",
            "เห็นคุณค่าในตนเองและผู้อื่น",
            "แสดงความภาคภูมิใจในตนเองอย่างเหมาะสม",
            "เคารพสิทธิและความคิดเห็นของผู้อื่น",
        ],
    ),
    (
        "การคิดวิเคราะห์และคิดอย่างมีวิจารณญาณ",
        [
            "แยกแยะข้อเท็จจริงกับความคิดเห็นได้",
            "วิเคราะห์สาเหตุของปัญหาได้",
            "ตรวจสอบความน่าเชื่อถือของข้อมูลก่อนเชื่อ",
            "ประเมินผลดีผลเสียของทางเลือกได้",
            "ตัดสินใจโดยใช้เหตุผลประกอบ",
        ],
    ),
    (
        "การคิดสร้างสรรค์",
        [
            "เสนอความคิดใหม่ที่แตกต่างจากเดิม",
            "ดัดแปลงสิ่งที่มีอยู่ให้เกิดประโยชน์",
            "มองปัญหาได้หลายมุมมอง",
            "กล้าลองวิธีการใหม่ในการทำงาน",
            "นำความคิดไปสร้างผลงานได้จริง",
        ],
    ),
    (
        "การจัดการกับอารมณ์และความเครียด",
        [
            "รู้เท่าทันอารมณ์ของตนเอง",
            "ควบคุมอารมณ์ได้ในสถานการณ์กดดัน",
            "มีวิธีผ่อนคลายความเครียดที่เหมาะสม",
            "มองโลกในแง่ดีและมีความหวัง",
            "ขอความช่วยเหลือเมื่อเกินกำลังของตนเอง",
        ],
    ),
    (
        "การสร้างสัมพันธภาพและการสื่อสาร",
        [
            "รับฟังผู้อื่นอย่างตั้งใจ",
            "สื่อสารความต้องการของตนได้ชัดเจน",
            "ทำงานร่วมกับผู้อื่นได้",
            "ปฏิเสธสิ่งที่ไม่เหมาะสมได้อย่างสุภาพ",
            "แก้ไขความขัดแย้งอย่างสร้างสรรค์",
        ],
    ),
    (
        "การแก้ปัญหาและการรับผิดชอบต่อสังคม",
        [
            "วางแผนแก้ปัญหาอย่างเป็นขั้นตอน",
            "ลงมือแก้ปัญหาตามแผนที่วางไว้",
            "ยอมรับผลที่เกิดจากการกระทำของตนเอง",
            "ช่วยเหลือและมีจิตอาสาต่อส่วนรวม",
            "ปฏิบัติตามกฎกติกาของสังคม",
        ],
    ),
];

pub fn teachers() -> Vec<Teacher> {
    TEACHERS
        .iter()
        .map(|(username, name, class_level, room)| Teacher {
            username: username.to_string(),
            name: name.to_string(),
            class_level: class_level.to_string(),
            room: room.to_string(),
        })
        .collect()
}

/// Placeholder credential check: the password is the username.
pub fn authenticate(username: &str, password: &str) -> Option<Teacher> {
    teachers()
        .into_iter()
        .find(|t| t.username == username && t.username == password)
}

/// Roster for a class/room in roster order. Unknown pairs have no students.
pub fn roster_for(class_level: &str, room: &str) -> Vec<Student> {
    let names: &[&str] = match (class_level, room) {
        ("ม.4", "A") => ROSTER_M4A,
        ("ม.5", "A") => ROSTER_M5A,
        ("ม.6", "A") => ROSTER_M6A,
        _ => &[],
    };
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Student {
            id: i as u32 + 1,
            name: name.to_string(),
            class_level: class_level.to_string(),
            room: room.to_string(),
        })
        .collect()
}

pub fn indicators() -> Vec<Indicator> {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(i, (title, prompts))| Indicator {
            id: i as u32 + 1,
            title: *title,
            questions: prompts
                .iter()
                .enumerate()
                .map(|(j, text)| Question {
                    id: (i * prompts.len() + j) as u32 + 1,
                    text: *text,
                })
                .collect(),
        })
        .collect()
}

pub fn question_ids() -> impl Iterator<Item = u32> {
    1..=QUESTION_COUNT as u32
}
