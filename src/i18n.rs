// src/i18n.rs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "ru" => Some(Language::Russian),
            "en" => Some(Language::English),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::English => "en",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Russian => "Русский",
            Language::English => "English",
        }
    }

    pub fn text(&self, key: UiText) -> &'static str {
        match (self, key) {
            (Language::Russian, UiText::LoginTitle) => "Вход в систему",
            (Language::Russian, UiText::Login) => "Логин",
            (Language::Russian, UiText::Password) => "Пароль",
            (Language::Russian, UiText::Enter) => "Войти",
            (Language::Russian, UiText::MainTitle) => "Главное окно",
            (Language::Russian, UiText::Bearing) => "Подшипник",
            (Language::Russian, UiText::SelectDates) => "Выбрать дату прогноза",
            (Language::Russian, UiText::Visualize) => "Визуализация процесса",
            (Language::Russian, UiText::SendMessage) => "Отправить сообщение",
            (Language::Russian, UiText::DateFrom) => "С",
            (Language::Russian, UiText::DateTo) => "По",
            (Language::Russian, UiText::Predict) => "Спрогнозировать",
            (Language::Russian, UiText::PlotTitle) => "Окно визуализации",
            (Language::Russian, UiText::Forecast) => "Прогнозные значения",
            (Language::Russian, UiText::ForecastMin) => "Минимальные прогнозные значения",
            (Language::Russian, UiText::ForecastMax) => "Максимальные прогнозные значения",
            (Language::Russian, UiText::Outliers) => "Аномальные значения",
            (Language::Russian, UiText::AxisTime) => "Время",
            (Language::Russian, UiText::AxisVibration) => "Вибрация (мкм)",
            (Language::Russian, UiText::ExportPng) => "Сохранить PNG",
            (Language::Russian, UiText::Exported) => "График сохранён:",
            (Language::Russian, UiText::ExportFailed) => "Не удалось сохранить график:",
            (Language::Russian, UiText::SendTitle) => "Отправка сообщения",
            (Language::Russian, UiText::Replace) => "Заменить",
            (Language::Russian, UiText::Until) => "До",
            (Language::Russian, UiText::Send) => "Отправить",
            (Language::Russian, UiText::SentOk) => "Сообщение успешно отправлено",
            (Language::Russian, UiText::SendFailed) => "Не удалось отправить сообщение:",
            (Language::Russian, UiText::BadCredentials) => "Введен неверный логин или пароль.",
            (Language::Russian, UiText::Offline) => "Проверьте подключение к интернету.",
            (Language::Russian, UiText::ConfirmExit) => {
                "Вы действительно хотите выйти из приложения?"
            }
            (Language::Russian, UiText::Yes) => "Да",
            (Language::Russian, UiText::No) => "Нет",
            (Language::Russian, UiText::Ok) => "OK",
            (Language::Russian, UiText::SameDay) => {
                "Даты начала и конца прогноза не могут быть равными.\nЕсли хотите сделать прогноз на 24 часа, укажите второй датой следующий день."
            }
            (Language::Russian, UiText::BeginAfterEnd) => {
                "Дата начала прогноза не может быть позже даты окончания прогноза."
            }
            (Language::Russian, UiText::FieldRequired) => "Заполните поле",
            (Language::Russian, UiText::FieldTooLong) => "Слишком длинное значение в поле",
            (Language::Russian, UiText::Working) => "Выполняется...",
            (Language::Russian, UiText::Language) => "Язык",
            (Language::Russian, UiText::Ready) => "Готово.",
            (Language::Russian, UiText::User) => "Пользователь:",
            (Language::Russian, UiText::NoSession) => "без сессии",
            (Language::Russian, UiText::ForecastPeriod) => "Период прогноза:",
            (Language::Russian, UiText::NotSelected) => "не выбран",

            (Language::English, UiText::LoginTitle) => "Sign in",
            (Language::English, UiText::Login) => "Login",
            (Language::English, UiText::Password) => "Password",
            (Language::English, UiText::Enter) => "Sign in",
            (Language::English, UiText::MainTitle) => "Main window",
            (Language::English, UiText::Bearing) => "Bearing",
            (Language::English, UiText::SelectDates) => "Choose forecast dates",
            (Language::English, UiText::Visualize) => "Visualize process",
            (Language::English, UiText::SendMessage) => "Send message",
            (Language::English, UiText::DateFrom) => "From",
            (Language::English, UiText::DateTo) => "To",
            (Language::English, UiText::Predict) => "Forecast",
            (Language::English, UiText::PlotTitle) => "Visualization",
            (Language::English, UiText::Forecast) => "Forecast values",
            (Language::English, UiText::ForecastMin) => "Minimum forecast values",
            (Language::English, UiText::ForecastMax) => "Maximum forecast values",
            (Language::English, UiText::Outliers) => "Anomalous values",
            (Language::English, UiText::AxisTime) => "Time",
            (Language::English, UiText::AxisVibration) => "Vibration (µm)",
            (Language::English, UiText::ExportPng) => "Save PNG",
            (Language::English, UiText::Exported) => "Plot saved:",
            (Language::English, UiText::ExportFailed) => "Could not save plot:",
            (Language::English, UiText::SendTitle) => "Send message",
            (Language::English, UiText::Replace) => "Replace",
            (Language::English, UiText::Until) => "Before",
            (Language::English, UiText::Send) => "Send",
            (Language::English, UiText::SentOk) => "Message sent successfully",
            (Language::English, UiText::SendFailed) => "Could not send message:",
            (Language::English, UiText::BadCredentials) => "Invalid login or password.",
            (Language::English, UiText::Offline) => "Check your internet connection.",
            (Language::English, UiText::ConfirmExit) => "Do you really want to quit?",
            (Language::English, UiText::Yes) => "Yes",
            (Language::English, UiText::No) => "No",
            (Language::English, UiText::Ok) => "OK",
            (Language::English, UiText::SameDay) => {
                "Forecast start and end dates cannot be equal.\nFor a 24-hour forecast pick the next day as the end date."
            }
            (Language::English, UiText::BeginAfterEnd) => {
                "Forecast start date cannot be after the end date."
            }
            (Language::English, UiText::FieldRequired) => "Please fill in",
            (Language::English, UiText::FieldTooLong) => "Value is too long in",
            (Language::English, UiText::Working) => "Working...",
            (Language::English, UiText::Language) => "Language",
            (Language::English, UiText::Ready) => "Ready.",
            (Language::English, UiText::User) => "User:",
            (Language::English, UiText::NoSession) => "no session",
            (Language::English, UiText::ForecastPeriod) => "Forecast period:",
            (Language::English, UiText::NotSelected) => "not selected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiText {
    LoginTitle,
    Login,
    Password,
    Enter,
    MainTitle,
    Bearing,
    SelectDates,
    Visualize,
    SendMessage,
    DateFrom,
    DateTo,
    Predict,
    PlotTitle,
    Forecast,
    ForecastMin,
    ForecastMax,
    Outliers,
    AxisTime,
    AxisVibration,
    ExportPng,
    Exported,
    ExportFailed,
    SendTitle,
    Replace,
    Until,
    Send,
    SentOk,
    SendFailed,
    BadCredentials,
    Offline,
    ConfirmExit,
    Yes,
    No,
    Ok,
    SameDay,
    BeginAfterEnd,
    FieldRequired,
    FieldTooLong,
    Working,
    Language,
    Ready,
    User,
    NoSession,
    ForecastPeriod,
    NotSelected,
}
