//! PyQt5 and its add-on packages.

use crate::bundle::asset::{Applies, AssetEntry, VersionedAsset};
use crate::bundle::package::{MsvcRuntime, PackageProfile};
use crate::core::{PlatformFamily::*, QtVersion};

const D: VersionedAsset = VersionedAsset::DEFAULT;

const QT_5_7: Option<QtVersion> = Some(QtVersion::new(5, 7, 0));
const QT_5_10: Option<QtVersion> = Some(QtVersion::new(5, 10, 0));

pub static PYQT5: PackageProfile = PackageProfile {
    name: "PyQt5",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::Shared("msvc_runtime"),
    openssl: true,
    table: &[
        ("QAxContainer", AssetEntry::Single(VersionedAsset { dll: false, ..D })),
        (
            "QtBluetooth",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::Only(Linux), &["QtConcurrent"])],
                qml: true,
                ..D
            }),
        ),
        (
            "QtCore",
            AssetEntry::Single(VersionedAsset {
                other_lib_deps: &[
                    (
                        Applies::Only(Linux),
                        &["libicui18n.so.56", "libicuuc.so.56", "libicudata.so.56"],
                    ),
                    // Older installers shipped ICU on Windows.
                    (Applies::Only(Windows), &["icu*.dll"]),
                ],
                translations: &[
                    "qt_help",
                    "qtbase",
                    "qtconnectivity",
                    "qtdeclarative",
                    "qtlocation",
                    "qtmultimedia",
                    "qtquickcontrols",
                    "qtserialport",
                    "qtwebsockets",
                    "qtxmlpatterns",
                    "qt_",
                ],
                excluded_plugins: Some(&["designer", "qmltooling"]),
                ..D
            }),
        ),
        ("QtDBus", AssetEntry::Single(D)),
        ("QtDesigner", AssetEntry::Single(D)),
        (
            "QtGui",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::Only(Linux), &["QtWaylandClient", "QtXcbQpa"])],
                other_lib_deps: &[(
                    Applies::Only(Windows),
                    &["d3dcompiler_47.dll", "libEGL.dll", "libGLESv2.dll", "opengl32sw.dll"],
                )],
                ..D
            }),
        ),
        ("QtHelp", AssetEntry::Single(D)),
        (
            "QtLocation",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[(Applies::All, &["QtPositioningQuick"])],
                qml: true,
                ..D
            }),
        ),
        (
            "QtMultimedia",
            AssetEntry::Single(VersionedAsset {
                lib_deps: &[
                    (Applies::All, &["QtMultimediaQuick"]),
                    (Applies::Only(Linux), &["QtMultimediaGstTools"]),
                ],
                qml: true,
                qml_names: Some(&["QtAudioEngine", "QtMultimedia"]),
                ..D
            }),
        ),
        ("QtMultimediaWidgets", AssetEntry::Single(D)),
        ("QtNetwork", AssetEntry::Single(D)),
        ("QtNfc", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtOpenGL", AssetEntry::Single(D)),
        ("QtPositioning", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtPrintSupport", AssetEntry::Single(D)),
        (
            "QtQml",
            AssetEntry::Variants(&[
                VersionedAsset {
                    version: Some(QtVersion::new(5, 14, 0)),
                    lib_deps: &[(Applies::All, &["QtQmlModels", "QtQmlWorkerScript"])],
                    qml: true,
                    qml_names: Some(&["Qt", "QtQml"]),
                    ..D
                },
                VersionedAsset {
                    qml: true,
                    qml_names: Some(&["Qt", "QtQml"]),
                    ..D
                },
            ]),
        ),
        (
            "QtQuick",
            AssetEntry::Variants(&[
                VersionedAsset {
                    version: Some(QtVersion::new(5, 14, 0)),
                    lib_deps: &[(
                        Applies::All,
                        &[
                            "QtQuickControls2",
                            "QtQuickParticles",
                            "QtQuickShapes",
                            "QtQuickTemplates2",
                            "QtQuickTest",
                        ],
                    )],
                    qml: true,
                    qml_names: Some(&["QtGraphicalEffects", "QtQuick", "QtQuick.2"]),
                    ..D
                },
                VersionedAsset {
                    lib_deps: &[(
                        Applies::All,
                        &["QtQuickControls2", "QtQuickParticles", "QtQuickTemplates2", "QtQuickTest"],
                    )],
                    qml: true,
                    qml_names: Some(&["QtGraphicalEffects", "QtQuick", "QtQuick.2"]),
                    ..D
                },
            ]),
        ),
        (
            "QtQuick3D",
            AssetEntry::Single(VersionedAsset {
                version: Some(QtVersion::new(5, 15, 0)),
                lib_deps: &[(
                    Applies::All,
                    &[
                        "QtQuick3DAssetImport",
                        "QtQuick3DRender",
                        "QtQuick3DRuntimeRender",
                        "QtQuick3DUtils",
                    ],
                )],
                qml: true,
                ..D
            }),
        ),
        ("QtQuickWidgets", AssetEntry::Single(D)),
        (
            "QtRemoteObjects",
            AssetEntry::Single(VersionedAsset {
                version: Some(QtVersion::new(5, 12, 0)),
                qml: true,
                ..D
            }),
        ),
        ("QtSensors", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtSerialPort", AssetEntry::Single(D)),
        ("QtSql", AssetEntry::Single(D)),
        ("QtSvg", AssetEntry::Single(D)),
        ("QtTest", AssetEntry::Single(D)),
        (
            "QtTextToSpeech",
            AssetEntry::Single(VersionedAsset {
                version: Some(QtVersion::new(5, 15, 0)),
                ..D
            }),
        ),
        ("QtWebChannel", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtWebSockets", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
        ("QtWidgets", AssetEntry::Single(D)),
        ("QtXml", AssetEntry::Single(D)),
        ("QtXmlPatterns", AssetEntry::Single(VersionedAsset { qml: true, ..D })),
    ],
};

pub static PYQT3D: PackageProfile = PackageProfile {
    name: "PyQt3D",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    // Qt3D was added in Qt v5.6 but first wrapped for v5.7.
    table: &[
        (
            "Qt3DAnimation",
            AssetEntry::Single(VersionedAsset {
                version: QT_5_10,
                lib_deps: &[(Applies::All, &["Qt3DQuickAnimation"])],
                ..D
            }),
        ),
        (
            "Qt3DCore",
            AssetEntry::Single(VersionedAsset {
                version: QT_5_7,
                lib_deps: &[(Applies::All, &["Qt3DQuick"])],
                qml: true,
                qml_names: Some(&["Qt3D"]),
                ..D
            }),
        ),
        (
            "Qt3DExtras",
            AssetEntry::Single(VersionedAsset {
                version: QT_5_7,
                lib_deps: &[(Applies::All, &["Qt3DQuickExtras"])],
                ..D
            }),
        ),
        (
            "Qt3DInput",
            AssetEntry::Variants(&[
                VersionedAsset {
                    version: Some(QtVersion::new(5, 7, 1)),
                    lib_deps: &[(Applies::All, &["Qt3DQuickInput", "QtGamepad"])],
                    ..D
                },
                VersionedAsset {
                    version: QT_5_7,
                    lib_deps: &[(Applies::All, &["Qt3DQuickInput"])],
                    ..D
                },
            ]),
        ),
        ("Qt3DLogic", AssetEntry::Single(VersionedAsset { version: QT_5_7, ..D })),
        (
            "Qt3DRender",
            AssetEntry::Single(VersionedAsset {
                version: QT_5_7,
                lib_deps: &[
                    (Applies::Only(Windows), &["QtConcurrent"]),
                    (Applies::All, &["Qt3DQuickRender", "Qt3DQuickScene2D"]),
                ],
                ..D
            }),
        ),
    ],
};

pub static PYQTWEBENGINE: PackageProfile = PackageProfile {
    name: "PyQtWebEngine",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[
        (
            "QtWebEngine",
            AssetEntry::Single(VersionedAsset {
                translations: &["qtwebengine"],
                ..D
            }),
        ),
        (
            "QtWebEngineCore",
            AssetEntry::Single(VersionedAsset {
                other_lib_deps: &[(
                    Applies::Only(MacOs),
                    &["QtWebEngineCore.framework/Helpers/QtWebEngineProcess.app/Contents/Info.plist"],
                )],
                exes: &[
                    (Applies::Only(Linux), &["libexec/QtWebEngineProcess"]),
                    (
                        Applies::Only(MacOs),
                        &["lib/QtWebEngineCore.framework/Helpers/QtWebEngineProcess.app/Contents/MacOS/QtWebEngineProcess"],
                    ),
                    (Applies::Only(Windows), &["bin/QtWebEngineProcess.exe"]),
                ],
                files: &[(
                    Applies::Only(MacOs),
                    &[(
                        "lib/QtWebEngineCore.framework/Libraries/.ignore",
                        "Wheels cannot contain empty directories.\n",
                    )],
                )],
                others: &[
                    (Applies::Only(Linux), &["resources", "translations/qtwebengine_locales"]),
                    (Applies::Only(Windows), &["resources", "translations/qtwebengine_locales"]),
                ],
                ..D
            }),
        ),
        ("QtWebEngineWidgets", AssetEntry::Single(D)),
    ],
};

pub static PYQTPURCHASING: PackageProfile = PackageProfile {
    name: "PyQtPurchasing",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[(
        "QtPurchasing",
        AssetEntry::Single(VersionedAsset {
            version: QT_5_7,
            qml: true,
            ..D
        }),
    )],
};

pub static PYQTNETWORKAUTH: PackageProfile = PackageProfile {
    name: "PyQtNetworkAuth",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[("QtNetworkAuth", AssetEntry::Single(VersionedAsset { lgpl: false, ..D }))],
};

pub static PYQTDATAVISUALIZATION: PackageProfile = PackageProfile {
    name: "PyQtDataVisualization",
    qt_major: 5,
    msvc_runtime: MsvcRuntime::None,
    openssl: false,
    table: &[("QtDataVisualization", AssetEntry::Single(VersionedAsset { lgpl: false, ..D }))],
};
